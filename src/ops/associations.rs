use std::collections::HashSet;

use crate::model::{AssociationInput, ContentId, TaggedEntry};
use crate::store::{StoreError, TagStore};

/// Replace every association of `content` with exactly `entries`.
///
/// The set is checked for repeated tag ids before the store is touched; the
/// store itself swaps the whole set atomically.
pub fn replace(
    store: &dyn TagStore,
    content: &ContentId,
    entries: &[AssociationInput],
) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(entries.len());
    if let Some(dup) = entries.iter().find(|e| !seen.insert(e.tag_id)) {
        return Err(StoreError::DuplicateAssociation(dup.tag_id));
    }
    store.replace_associations(content, entries)?;
    tracing::info!(content = %content, count = entries.len(), "replaced associations");
    Ok(())
}

/// Tags attached to `content`, with their confirmation state
pub fn list_for(store: &dyn TagStore, content: &ContentId) -> Result<Vec<TaggedEntry>, StoreError> {
    store.list_associations(content)
}
