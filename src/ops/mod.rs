pub mod associations;
pub mod registry;
pub mod sync;

pub use registry::{MAX_TAG_NAME_LEN, ValidationError, resolve, validate_tag_name};
pub use sync::{load_tags, sync_tags};

use crate::store::StoreError;

/// Error type for tag operations
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("invalid tag name: {0}")]
    Validation(#[from] ValidationError),
    #[error("could not save tags: {0}")]
    Persistence(#[from] StoreError),
}
