//! Persistence collaborator for the tag registry and content associations.
//!
//! Everything above this layer talks to a `&dyn TagStore`. Two backends
//! ship with the crate: [`MemoryStore`] for embedding and tests, and the
//! JSON snapshot store in `io::file_store` used by the `td` binary.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

use crate::io::lock::LockError;
use crate::model::{AssociationInput, ContentId, OwnerId, Tag, TagId, TaggedEntry};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("tag \"{normalized}\" already exists for owner {owner}")]
    DuplicateTag { owner: OwnerId, normalized: String },
    #[error("unknown tag id {0}")]
    UnknownTag(TagId),
    #[error("tag id {0} appears more than once in the association set")]
    DuplicateAssociation(TagId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Operations the tag core needs from its backing store.
///
/// `replace_associations` must be atomic per content id: a reader calling
/// `list_associations` concurrently sees either the complete old set or the
/// complete new set.
pub trait TagStore: Send + Sync {
    fn find_tag_by_owner_and_normalized_name(
        &self,
        owner: &OwnerId,
        normalized_name: &str,
    ) -> Result<Option<Tag>, StoreError>;

    /// Create a tag. Fails with `DuplicateTag` if the owner already has a tag
    /// with the same normalized name.
    fn create_tag(&self, owner: &OwnerId, name: &str, auto_generated: bool)
    -> Result<Tag, StoreError>;

    fn replace_associations(
        &self,
        content: &ContentId,
        entries: &[AssociationInput],
    ) -> Result<(), StoreError>;

    /// Associations for `content`, in the order of the last replace.
    fn list_associations(&self, content: &ContentId) -> Result<Vec<TaggedEntry>, StoreError>;

    /// All tags of an owner, oldest first.
    fn list_tags(&self, owner: &OwnerId) -> Result<Vec<Tag>, StoreError>;
}
