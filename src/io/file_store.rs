use std::fs;
use std::path::{Path, PathBuf};

use crate::io::lock::FileLock;
use crate::io::recovery::atomic_write;
use crate::model::{AssociationInput, ContentId, OwnerId, Tag, TaggedEntry};
use crate::store::{Snapshot, StoreError, TagStore};

/// Store backed by a JSON snapshot file inside the workspace directory.
///
/// Mutations hold the workspace `FileLock` for the whole
/// read-modify-write cycle and publish the result with a temp file +
/// rename. Reads take no lock: a rename is atomic, so a reader gets either
/// the previous snapshot or the next one in full.
#[derive(Debug, Clone)]
pub struct FileStore {
    workspace_dir: PathBuf,
    path: PathBuf,
}

impl FileStore {
    pub fn new(workspace_dir: &Path, file_name: &str) -> Self {
        FileStore {
            workspace_dir: workspace_dir.to_path_buf(),
            path: workspace_dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty snapshot if the file does not exist yet.
    pub fn init(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        self.write_snapshot(&Snapshot::default())
    }

    fn load(&self) -> Result<Snapshot, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Snapshot::default()),
            Ok(text) => {
                let snapshot: Snapshot = serde_json::from_str(&text)?;
                snapshot.check()?;
                Ok(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        atomic_write(&self.path, content.as_bytes())?;
        Ok(())
    }

    /// Run `f` against the current snapshot under the workspace lock and
    /// persist the snapshot only if `f` succeeds.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = FileLock::acquire_default(&self.workspace_dir)?;
        let mut snapshot = self.load()?;
        let out = f(&mut snapshot)?;
        self.write_snapshot(&snapshot)?;
        Ok(out)
    }
}

impl TagStore for FileStore {
    fn find_tag_by_owner_and_normalized_name(
        &self,
        owner: &OwnerId,
        normalized_name: &str,
    ) -> Result<Option<Tag>, StoreError> {
        Ok(self.load()?.find_tag(owner, normalized_name).cloned())
    }

    fn create_tag(
        &self,
        owner: &OwnerId,
        name: &str,
        auto_generated: bool,
    ) -> Result<Tag, StoreError> {
        self.mutate(|snap| snap.create_tag(owner, name, auto_generated))
    }

    fn replace_associations(
        &self,
        content: &ContentId,
        entries: &[AssociationInput],
    ) -> Result<(), StoreError> {
        self.mutate(|snap| snap.replace_associations(content, entries))
    }

    fn list_associations(&self, content: &ContentId) -> Result<Vec<TaggedEntry>, StoreError> {
        self.load()?.list_associations(content)
    }

    fn list_tags(&self, owner: &OwnerId) -> Result<Vec<Tag>, StoreError> {
        Ok(self.load()?.list_tags(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path(), "store.json");
        assert!(store.list_tags(&OwnerId::new("u1")).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn tags_and_associations_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let owner = OwnerId::new("u1");
        let content = ContentId::new("c1");
        {
            let store = FileStore::new(tmp.path(), "store.json");
            store.init().unwrap();
            let tag = store.create_tag(&owner, "Rust", false).unwrap();
            store
                .replace_associations(
                    &content,
                    &[AssociationInput {
                        tag_id: tag.id,
                        confirmed: false,
                    }],
                )
                .unwrap();
        }

        let reopened = FileStore::new(tmp.path(), "store.json");
        let entries = reopened.list_associations(&content).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tag.name, "Rust");
        assert!(!entries[0].confirmed);
        assert!(
            reopened
                .find_tag_by_owner_and_normalized_name(&owner, "rust")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let owner = OwnerId::new("u1");
        let store = FileStore::new(tmp.path(), "store.json");
        store.create_tag(&owner, "Rust", false).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.create_tag(&owner, "rust", false).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTag { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("store.json"), "not json {{{").unwrap();
        let store = FileStore::new(tmp.path(), "store.json");
        assert!(matches!(
            store.list_tags(&OwnerId::new("u1")),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn file_with_duplicate_edges_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("store.json"),
            r#"{
  "last_tag_id": 1,
  "tags": [
    { "id": 1, "name": "rust", "normalized_name": "rust", "owner_id": "u1" }
  ],
  "associations": {
    "b1": [
      { "tag_id": 1, "confirmed": true },
      { "tag_id": 1, "confirmed": false }
    ]
  }
}"#,
        )
        .unwrap();
        let store = FileStore::new(tmp.path(), "store.json");
        assert!(matches!(
            store.list_associations(&ContentId::new("b1")),
            Err(StoreError::DuplicateAssociation(_))
        ));
    }
}
