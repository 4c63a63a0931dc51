use serde::{Deserialize, Serialize};

use super::tag::{ContentId, Tag, TagId};

/// An edge between a content item and a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub content_id: ContentId,
    pub tag_id: TagId,
    /// `true` once the user accepted the tag; `false` for a pending suggestion
    pub confirmed: bool,
}

/// One element of the set handed to `replace_associations`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationInput {
    pub tag_id: TagId,
    pub confirmed: bool,
}

/// A tag as it is attached to a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntry {
    pub tag: Tag,
    pub confirmed: bool,
}

/// A tag name the caller wants on a content item, before resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredTag {
    pub name: String,
    pub confirmed: bool,
}

impl DesiredTag {
    /// A user-entered tag (confirmed)
    pub fn confirmed(name: impl Into<String>) -> Self {
        DesiredTag {
            name: name.into(),
            confirmed: true,
        }
    }

    /// A suggested tag the user has not accepted yet
    pub fn suggested(name: impl Into<String>) -> Self {
        DesiredTag {
            name: name.into(),
            confirmed: false,
        }
    }
}
