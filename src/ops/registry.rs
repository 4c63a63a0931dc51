use crate::model::{OwnerId, Tag, normalize_tag_name};
use crate::store::{StoreError, TagStore};

use super::TagError;

/// Longest accepted tag name, in characters (matches the editor input limit)
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Why a tag name was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("tag name is empty")]
    Empty,
    #[error("tag name is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
}

/// Check a raw tag name and return its trimmed form.
pub fn validate_tag_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_TAG_NAME_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_TAG_NAME_LEN,
        });
    }
    Ok(trimmed)
}

/// Resolve `name` to the owner's canonical tag, creating it on first use.
///
/// Lookup is by normalized name, so `" React"`, `"react"` and `"REACT "`
/// all land on the same record. A tag created here is always user-authored
/// (`auto_generated = false`).
pub fn resolve(store: &dyn TagStore, owner: &OwnerId, name: &str) -> Result<Tag, TagError> {
    let trimmed = validate_tag_name(name)?;
    let normalized = normalize_tag_name(trimmed);

    if let Some(existing) = store.find_tag_by_owner_and_normalized_name(owner, &normalized)? {
        return Ok(existing);
    }

    match store.create_tag(owner, trimmed, false) {
        Ok(tag) => {
            tracing::debug!(owner = %owner, tag = %tag.name, id = %tag.id, "created tag");
            Ok(tag)
        }
        // Another writer created it between our lookup and insert
        Err(StoreError::DuplicateTag { .. }) => store
            .find_tag_by_owner_and_normalized_name(owner, &normalized)?
            .ok_or_else(|| {
                TagError::Persistence(StoreError::Unavailable(format!(
                    "tag \"{}\" reported as duplicate but not found",
                    normalized
                )))
            }),
        Err(e) => Err(e.into()),
    }
}
