use std::iter;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::{
    ContentId, DesiredTag, EditorConfig, OwnerId, Tag, TagId, TaggedEntry, normalize_tag_name,
};
use crate::ops::{TagError, ValidationError, sync_tags, validate_tag_name};
use crate::store::TagStore;

use super::announce::{Announcement, Announcer};

/// Default window in which repeated add requests collapse into one
pub const DEFAULT_ADD_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identity of a chip in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipId {
    /// Added in this session, not yet persisted
    Local(u64),
    /// Backed by a persisted tag
    Stored(TagId),
}

/// A tag as presented in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
    pub id: ChipId,
    pub name: String,
    pub auto_generated: bool,
    pub confirmed: bool,
}

impl TagChip {
    fn from_entry(entry: TaggedEntry) -> Self {
        TagChip {
            id: ChipId::Stored(entry.tag.id),
            name: entry.tag.name,
            auto_generated: entry.tag.auto_generated,
            confirmed: entry.confirmed,
        }
    }
}

/// Arrow-key direction for chip navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Disables add, remove, confirm and commit. Navigation still works.
    pub read_only: bool,
    pub max_tags: Option<usize>,
    pub add_debounce: Duration,
}

impl Default for EditorOptions {
    fn default() -> Self {
        EditorOptions {
            read_only: false,
            max_tags: None,
            add_debounce: DEFAULT_ADD_DEBOUNCE,
        }
    }
}

impl From<&EditorConfig> for EditorOptions {
    fn from(config: &EditorConfig) -> Self {
        EditorOptions {
            read_only: config.read_only,
            max_tags: config.max_tags,
            add_debounce: Duration::from_millis(config.add_debounce_ms),
        }
    }
}

/// Result of an add request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(ChipId),
    /// A chip with the same name (ignoring case) already exists; input cleared
    Duplicate,
    /// Input left untouched
    Invalid(ValidationError),
    LimitReached,
    /// Collapsed into an add request made moments earlier
    Debounced,
    ReadOnly,
    Busy,
}

/// Error type for commits
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("editor is read-only")]
    ReadOnly,
    #[error("a commit is already in progress")]
    Busy,
    #[error("no commit in progress")]
    NotInFlight,
    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Client-side state of a tag editor for one content item.
///
/// Edits are local and optimistic until [`EditorSession::commit`]. Every
/// transition builds a fresh `tags` sequence, so a snapshot obtained from
/// [`EditorSession::tags`] never changes underneath its holder.
#[derive(Debug)]
pub struct EditorSession {
    content_id: ContentId,
    tags: Arc<[TagChip]>,
    input: String,
    focused_index: Option<usize>,
    options: EditorOptions,
    announcer: Announcer,
    /// Start of the current add-debounce window
    add_window_start: Option<Instant>,
    /// Desired list sent by the outstanding commit, if any
    pending_commit: Option<Vec<DesiredTag>>,
    next_local_id: u64,
}

/// Open an editor for `content` seeded with its persisted tags.
pub fn open_editor(
    content: ContentId,
    initial: Vec<TaggedEntry>,
    options: EditorOptions,
) -> EditorSession {
    EditorSession::open(content, initial, options)
}

impl EditorSession {
    pub fn open(content: ContentId, initial: Vec<TaggedEntry>, options: EditorOptions) -> Self {
        EditorSession {
            content_id: content,
            tags: initial.into_iter().map(TagChip::from_entry).collect(),
            input: String::new(),
            focused_index: None,
            options,
            announcer: Announcer::default(),
            add_window_start: None,
            pending_commit: None,
            next_local_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    pub fn tags(&self) -> Arc<[TagChip]> {
        Arc::clone(&self.tags)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Index of the chip holding keyboard focus; `None` = the input box
    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    pub fn focused_chip(&self) -> Option<&TagChip> {
        self.focused_index.and_then(|i| self.tags.get(i))
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    /// True while a commit is outstanding
    pub fn is_busy(&self) -> bool {
        self.pending_commit.is_some()
    }

    pub fn announcement(&self) -> Option<&Announcement> {
        self.announcer.current()
    }

    pub fn take_announcement(&mut self) -> Option<Announcement> {
        self.announcer.take()
    }

    /// The current chips as a synchronizer request
    pub fn desired_tags(&self) -> Vec<DesiredTag> {
        self.tags
            .iter()
            .map(|c| DesiredTag {
                name: c.name.clone(),
                confirmed: c.confirmed,
            })
            .collect()
    }

    fn editable(&self) -> bool {
        !self.options.read_only && self.pending_commit.is_none()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn focus_input(&mut self) {
        self.focused_index = None;
    }

    // -----------------------------------------------------------------------
    // Add / remove / confirm
    // -----------------------------------------------------------------------

    pub fn request_add(&mut self) -> AddOutcome {
        self.request_add_at(Instant::now())
    }

    /// Add the pending input as a tag, as of `now`.
    pub fn request_add_at(&mut self, now: Instant) -> AddOutcome {
        if self.options.read_only {
            return AddOutcome::ReadOnly;
        }
        if self.pending_commit.is_some() {
            return AddOutcome::Busy;
        }
        if let Some(start) = self.add_window_start
            && now.saturating_duration_since(start) < self.options.add_debounce
        {
            return AddOutcome::Debounced;
        }
        self.add_window_start = Some(now);

        let name = match validate_tag_name(&self.input) {
            Ok(name) => name.to_string(),
            Err(e) => return AddOutcome::Invalid(e),
        };
        if let Some(max) = self.options.max_tags
            && self.tags.len() >= max
        {
            return AddOutcome::LimitReached;
        }

        let normalized = normalize_tag_name(&name);
        if self
            .tags
            .iter()
            .any(|c| normalize_tag_name(&c.name) == normalized)
        {
            self.input.clear();
            self.focused_index = None;
            return AddOutcome::Duplicate;
        }

        self.next_local_id += 1;
        let id = ChipId::Local(self.next_local_id);
        let chip = TagChip {
            id,
            name: name.clone(),
            auto_generated: false,
            confirmed: true,
        };
        self.tags = self.tags.iter().cloned().chain(iter::once(chip)).collect();
        self.input.clear();
        self.focused_index = None;
        self.announcer.announce(format!("Tag {} added", name));
        AddOutcome::Added(id)
    }

    /// Remove the chip with `id`. Returns false if nothing was removed.
    pub fn request_remove(&mut self, id: ChipId) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(pos) = self.tags.iter().position(|c| c.id == id) else {
            return false;
        };
        let name = self.tags[pos].name.clone();
        self.tags = self
            .tags
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != pos)
            .map(|(_, c)| c.clone())
            .collect();
        self.focused_index = None;
        self.announcer.announce(format!("Tag {} removed", name));
        true
    }

    /// Backspace on an empty input: remove the last chip.
    pub fn remove_last(&mut self) -> bool {
        if !self.input.is_empty() {
            return false;
        }
        match self.tags.last() {
            Some(last) => self.request_remove(last.id),
            None => false,
        }
    }

    /// Accept a suggested (unconfirmed) chip.
    pub fn request_confirm(&mut self, id: ChipId) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(pos) = self.tags.iter().position(|c| c.id == id && !c.confirmed) else {
            return false;
        };
        let name = self.tags[pos].name.clone();
        self.tags = self
            .tags
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == pos {
                    TagChip {
                        confirmed: true,
                        ..c.clone()
                    }
                } else {
                    c.clone()
                }
            })
            .collect();
        self.announcer.announce(format!("Tag {} confirmed", name));
        true
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move keyboard focus between the input and the chips. Returns false if
    /// the key does nothing here (e.g. Left with text in the input, which
    /// belongs to the text cursor).
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let len = self.tags.len();
        let next = match (self.focused_index, direction) {
            (None, Direction::Left) if self.input.is_empty() && len > 0 => Some(len - 1),
            (Some(i), Direction::Left) if i > 0 => Some(i - 1),
            (Some(i), Direction::Right) if i + 1 < len => Some(i + 1),
            (Some(_), Direction::Right) => None,
            _ => return false,
        };
        self.focused_index = next;
        true
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Mark the session busy and return the list to synchronize.
    pub fn begin_commit(&mut self) -> Result<Vec<DesiredTag>, CommitError> {
        if self.options.read_only {
            return Err(CommitError::ReadOnly);
        }
        if self.pending_commit.is_some() {
            return Err(CommitError::Busy);
        }
        let desired = self.desired_tags();
        self.pending_commit = Some(desired.clone());
        Ok(desired)
    }

    /// Apply the synchronizer's answer to the outstanding commit.
    ///
    /// On success the chips become the canonical persisted tags. On failure
    /// the chips are left exactly as they were and the error is returned so
    /// the caller can retry.
    pub fn finish_commit(
        &mut self,
        result: Result<Vec<Tag>, TagError>,
    ) -> Result<Arc<[TagChip]>, CommitError> {
        let desired = self.pending_commit.take().ok_or(CommitError::NotInFlight)?;
        match result {
            Ok(canonical) => {
                self.tags = canonical
                    .into_iter()
                    .map(|tag| {
                        let confirmed = desired
                            .iter()
                            .find(|d| normalize_tag_name(&d.name) == tag.normalized_name)
                            .is_none_or(|d| d.confirmed);
                        TagChip {
                            id: ChipId::Stored(tag.id),
                            name: tag.name,
                            auto_generated: tag.auto_generated,
                            confirmed,
                        }
                    })
                    .collect();
                if self.focused_index.is_some_and(|i| i >= self.tags.len()) {
                    self.focused_index = None;
                }
                self.announcer.announce("Tags saved");
                Ok(self.tags())
            }
            Err(e) => {
                self.announcer.announce(format!("Tags not saved: {}", e));
                Err(e.into())
            }
        }
    }

    /// Persist the current chips through the synchronizer.
    pub fn commit(
        &mut self,
        store: &dyn TagStore,
        owner: &OwnerId,
    ) -> Result<Arc<[TagChip]>, CommitError> {
        let desired = self.begin_commit()?;
        let result = sync_tags(store, &self.content_id, owner, &desired);
        self.finish_commit(result)
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Registry tags starting with the current input that are not on the
    /// content yet.
    pub fn completions<'a>(&self, known: &'a [Tag]) -> Vec<&'a Tag> {
        let prefix = normalize_tag_name(&self.input);
        if prefix.is_empty() {
            return Vec::new();
        }
        known
            .iter()
            .filter(|t| t.normalized_name.starts_with(&prefix))
            .filter(|t| {
                !self
                    .tags
                    .iter()
                    .any(|c| normalize_tag_name(&c.name) == t.normalized_name)
            })
            .collect()
    }
}
