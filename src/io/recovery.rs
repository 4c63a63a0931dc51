use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::editor::{CommitError, EditorSession};
use crate::io::workspace::Workspace;
use crate::model::{ContentId, DesiredTag};
use crate::ops::TagError;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- tagdeck recovery log: append-only record of tag edits that could not be saved.
     Each entry lists the tags you had on a content item when the commit failed.
     View with: td recovery
     Safe to delete once the edits are re-applied. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A commit from an editor session failed in the store
    Commit,
    /// A direct `td set` sync failed
    Sync,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Commit => write!(f, "commit"),
            RecoveryCategory::Sync => write!(f, "sync"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "commit" => Some(RecoveryCategory::Commit),
            "sync" => Some(RecoveryCategory::Sync),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are reported through tracing
/// and otherwise swallowed.
pub fn log_recovery(workspace_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(workspace_dir, entry) {
        tracing::warn!(error = %e, "could not write to recovery log");
    }
}

fn log_recovery_inner(workspace_dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(workspace_dir);
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Record the tag list of a failed save so it can be re-applied by hand.
pub fn log_failed_save(
    workspace_dir: &Path,
    category: RecoveryCategory,
    content: &ContentId,
    desired: &[DesiredTag],
    error: &str,
) {
    let body = desired
        .iter()
        .map(|d| {
            if d.confirmed {
                d.name.clone()
            } else {
                format!("{} (suggested)", d.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    log_recovery(
        workspace_dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: format!("tags for {} not saved", content),
            fields: vec![
                ("Content".to_string(), content.to_string()),
                ("Error".to_string(), error.to_string()),
            ],
            body,
        },
    );
}

/// Commit an editor session against the workspace store. If the store
/// refuses the write, the session's tag list goes to the recovery log.
pub fn commit_with_recovery(
    ws: &Workspace,
    session: &mut EditorSession,
) -> Result<(), CommitError> {
    let desired = session.desired_tags();
    match session.commit(&ws.store(), &ws.owner()) {
        Ok(_) => Ok(()),
        Err(CommitError::Tag(TagError::Persistence(e))) => {
            log_failed_save(
                &ws.dir,
                RecoveryCategory::Commit,
                session.content_id(),
                &desired,
                &e.to_string(),
            );
            Err(CommitError::Tag(TagError::Persistence(e)))
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(workspace_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(workspace_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }
    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" || line.starts_with("## ") {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn failed_save_round_trips_through_log() {
        let tmp = TempDir::new().unwrap();
        let content = ContentId::new("bookmark-9");
        log_failed_save(
            tmp.path(),
            RecoveryCategory::Commit,
            &content,
            &[DesiredTag::confirmed("React"), DesiredTag::suggested("AI")],
            "store unavailable: offline",
        );

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.category, RecoveryCategory::Commit);
        assert_eq!(entry.description, "tags for bookmark-9 not saved");
        assert_eq!(
            entry.fields,
            vec![
                ("Content".to_string(), "bookmark-9".to_string()),
                ("Error".to_string(), "store unavailable: offline".to_string()),
            ]
        );
        assert_eq!(entry.body, "React\nAI (suggested)");
    }

    #[test]
    fn header_written_once_and_newest_first() {
        let tmp = TempDir::new().unwrap();
        for id in ["a", "b", "c"] {
            log_failed_save(
                tmp.path(),
                RecoveryCategory::Sync,
                &ContentId::new(id),
                &[DesiredTag::confirmed("x")],
                "boom",
            );
        }
        let text = std::fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert_eq!(text.matches("tagdeck recovery log").count(), 1);

        let entries = read_recovery_entries(tmp.path(), Some(2));
        let ids: Vec<_> = entries.iter().map(|e| e.fields[0].1.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn failed_commit_is_recorded_and_session_kept() {
        use crate::editor::{AddOutcome, EditorOptions, open_editor};
        use crate::io::workspace::init_workspace;

        let tmp = TempDir::new().unwrap();
        let ws = init_workspace(tmp.path(), "alice", false).unwrap();
        std::fs::write(ws.store().path(), "{ not json").unwrap();

        let mut session = open_editor(ContentId::new("b1"), vec![], EditorOptions::default());
        session.set_input_text("rust");
        assert!(matches!(session.request_add(), AddOutcome::Added(_)));

        let err = commit_with_recovery(&ws, &mut session).unwrap_err();
        assert!(matches!(err, CommitError::Tag(TagError::Persistence(_))));
        assert_eq!(session.tags().len(), 1);

        let entries = read_recovery_entries(&ws.dir, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Commit);
        assert_eq!(entries[0].body, "rust");
    }

    #[test]
    fn read_only_commit_is_not_recorded() {
        use crate::editor::{EditorOptions, open_editor};
        use crate::io::workspace::init_workspace;

        let tmp = TempDir::new().unwrap();
        let ws = init_workspace(tmp.path(), "alice", false).unwrap();
        let options = EditorOptions {
            read_only: true,
            ..EditorOptions::default()
        };
        let mut session = open_editor(ContentId::new("b1"), vec![], options);

        assert!(matches!(
            commit_with_recovery(&ws, &mut session),
            Err(CommitError::ReadOnly)
        ));
        assert!(read_recovery_entries(&ws.dir, None).is_empty());
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(tmp.path(), None).is_empty());
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.json");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }
}
