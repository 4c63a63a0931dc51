use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::model::{
    Association, AssociationInput, ContentId, OwnerId, Tag, TagId, TaggedEntry,
    normalize_tag_name,
};

/// Complete store contents. Both backends apply every mutation to a
/// `Snapshot` value and publish it as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Last id handed out; ids start at 1
    #[serde(default)]
    pub last_tag_id: u64,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub associations: BTreeMap<ContentId, Vec<AssociationInput>>,
}

impl Snapshot {
    pub fn find_tag(&self, owner: &OwnerId, normalized_name: &str) -> Option<&Tag> {
        self.tags
            .iter()
            .find(|t| &t.owner_id == owner && t.normalized_name == normalized_name)
    }

    pub fn tag_by_id(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn create_tag(
        &mut self,
        owner: &OwnerId,
        name: &str,
        auto_generated: bool,
    ) -> Result<Tag, StoreError> {
        let normalized = normalize_tag_name(name);
        if self.find_tag(owner, &normalized).is_some() {
            return Err(StoreError::DuplicateTag {
                owner: owner.clone(),
                normalized,
            });
        }
        self.last_tag_id += 1;
        let tag = Tag {
            id: TagId(self.last_tag_id),
            name: name.trim().to_string(),
            normalized_name: normalized,
            auto_generated,
            owner_id: owner.clone(),
        };
        self.tags.push(tag.clone());
        Ok(tag)
    }

    /// Validate the whole set first, then swap it in. Nothing changes on error.
    pub fn replace_associations(
        &mut self,
        content: &ContentId,
        entries: &[AssociationInput],
    ) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for entry in entries {
            if self.tag_by_id(entry.tag_id).is_none() {
                return Err(StoreError::UnknownTag(entry.tag_id));
            }
            if !seen.insert(entry.tag_id) {
                return Err(StoreError::DuplicateAssociation(entry.tag_id));
            }
        }
        if entries.is_empty() {
            self.associations.remove(content);
        } else {
            self.associations.insert(content.clone(), entries.to_vec());
        }
        Ok(())
    }

    pub fn list_associations(&self, content: &ContentId) -> Result<Vec<TaggedEntry>, StoreError> {
        let Some(entries) = self.associations.get(content) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|e| {
                let tag = self
                    .tag_by_id(e.tag_id)
                    .ok_or(StoreError::UnknownTag(e.tag_id))?;
                Ok(TaggedEntry {
                    tag: tag.clone(),
                    confirmed: e.confirmed,
                })
            })
            .collect()
    }

    /// Every stored edge, grouped by content id
    pub fn associations(&self) -> impl Iterator<Item = Association> + '_ {
        self.associations.iter().flat_map(|(content, entries)| {
            entries.iter().map(move |e| Association {
                content_id: content.clone(),
                tag_id: e.tag_id,
                confirmed: e.confirmed,
            })
        })
    }

    /// Check the invariants a loaded snapshot must hold: per-owner unique
    /// normalized names, ids below the allocator, and edges that are unique on
    /// `(content_id, tag_id)` and point at existing tags.
    pub fn check(&self) -> Result<(), StoreError> {
        let mut names = HashSet::new();
        for tag in &self.tags {
            if !names.insert((&tag.owner_id, tag.normalized_name.as_str())) {
                return Err(StoreError::DuplicateTag {
                    owner: tag.owner_id.clone(),
                    normalized: tag.normalized_name.clone(),
                });
            }
            if tag.id.0 > self.last_tag_id {
                return Err(StoreError::Unavailable(format!(
                    "tag id {} is beyond the last allocated id {}",
                    tag.id, self.last_tag_id
                )));
            }
        }
        let mut edges = HashSet::new();
        for edge in self.associations() {
            if self.tag_by_id(edge.tag_id).is_none() {
                return Err(StoreError::UnknownTag(edge.tag_id));
            }
            if !edges.insert((edge.content_id, edge.tag_id)) {
                return Err(StoreError::DuplicateAssociation(edge.tag_id));
            }
        }
        Ok(())
    }

    pub fn list_tags(&self, owner: &OwnerId) -> Vec<Tag> {
        self.tags
            .iter()
            .filter(|t| &t.owner_id == owner)
            .cloned()
            .collect()
    }
}
