//! Interactive tag editor: local optimistic edits, keyboard navigation,
//! and an explicit commit through the synchronizer.

pub mod announce;
pub mod keys;
pub mod session;

pub use announce::{Announcement, Announcer};
pub use keys::{KeyOutcome, handle_key};
pub use session::{
    AddOutcome, ChipId, CommitError, Direction, EditorOptions, EditorSession, TagChip, open_editor,
};
