use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Snapshot, StoreError, TagStore};
use crate::model::{AssociationInput, ContentId, OwnerId, Tag, TaggedEntry};

/// In-process store. A replace runs entirely under the write lock, so
/// readers only ever see whole association sets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing contents, refusing a snapshot that breaks the
    /// store invariants.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        snapshot.check()?;
        Ok(MemoryStore {
            state: RwLock::new(snapshot),
        })
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Snapshot>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Snapshot>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl TagStore for MemoryStore {
    fn find_tag_by_owner_and_normalized_name(
        &self,
        owner: &OwnerId,
        normalized_name: &str,
    ) -> Result<Option<Tag>, StoreError> {
        Ok(self.read()?.find_tag(owner, normalized_name).cloned())
    }

    fn create_tag(
        &self,
        owner: &OwnerId,
        name: &str,
        auto_generated: bool,
    ) -> Result<Tag, StoreError> {
        self.write()?.create_tag(owner, name, auto_generated)
    }

    fn replace_associations(
        &self,
        content: &ContentId,
        entries: &[AssociationInput],
    ) -> Result<(), StoreError> {
        self.write()?.replace_associations(content, entries)
    }

    fn list_associations(&self, content: &ContentId) -> Result<Vec<TaggedEntry>, StoreError> {
        self.read()?.list_associations(content)
    }

    fn list_tags(&self, owner: &OwnerId) -> Result<Vec<Tag>, StoreError> {
        Ok(self.read()?.list_tags(owner))
    }
}
