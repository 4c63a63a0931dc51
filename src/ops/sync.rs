use indexmap::IndexMap;

use crate::model::{AssociationInput, ContentId, DesiredTag, OwnerId, Tag, TagId, TaggedEntry};
use crate::store::TagStore;

use super::registry::{self, validate_tag_name};
use super::{TagError, associations};

/// Make `desired` the complete tag set of `content`.
///
/// All names are validated and resolved before anything is written, and the
/// associations are replaced in a single store call. If any step fails the
/// content's previous associations are left exactly as they were.
///
/// Names that resolve to the same tag collapse to one edge; the first
/// occurrence decides both position and `confirmed`. Returns the canonical
/// tags in desired order.
pub fn sync_tags(
    store: &dyn TagStore,
    content: &ContentId,
    owner: &OwnerId,
    desired: &[DesiredTag],
) -> Result<Vec<Tag>, TagError> {
    for d in desired {
        validate_tag_name(&d.name)?;
    }

    let mut resolved: IndexMap<TagId, (Tag, bool)> = IndexMap::with_capacity(desired.len());
    for d in desired {
        let tag = registry::resolve(store, owner, &d.name)?;
        resolved.entry(tag.id).or_insert((tag, d.confirmed));
    }

    let entries: Vec<AssociationInput> = resolved
        .iter()
        .map(|(&tag_id, &(_, confirmed))| AssociationInput { tag_id, confirmed })
        .collect();

    associations::replace(store, content, &entries).inspect_err(|e| {
        tracing::warn!(content = %content, error = %e, "tag sync failed");
    })?;

    Ok(resolved.into_values().map(|(tag, _)| tag).collect())
}

/// Current tags of `content`, for seeding an editor session
pub fn load_tags(store: &dyn TagStore, content: &ContentId) -> Result<Vec<TaggedEntry>, TagError> {
    Ok(associations::list_for(store, content)?)
}
