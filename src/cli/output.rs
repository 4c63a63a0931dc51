use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::{Tag, TagId, TaggedEntry};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TagJson {
    pub id: TagId,
    pub name: String,
    pub auto_generated: bool,
}

#[derive(Serialize)]
pub struct TaggedJson {
    pub id: TagId,
    pub name: String,
    pub confirmed: bool,
    pub auto_generated: bool,
}

#[derive(Serialize)]
pub struct ContentTagsJson {
    pub content: String,
    pub tags: Vec<TaggedJson>,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

pub fn tag_to_json(tag: &Tag) -> TagJson {
    TagJson {
        id: tag.id,
        name: tag.name.clone(),
        auto_generated: tag.auto_generated,
    }
}

pub fn tagged_to_json(entry: &TaggedEntry) -> TaggedJson {
    TaggedJson {
        id: entry.tag.id,
        name: entry.tag.name.clone(),
        confirmed: entry.confirmed,
        auto_generated: entry.tag.auto_generated,
    }
}

pub fn content_tags_json(content: &str, entries: &[TaggedEntry]) -> ContentTagsJson {
    ContentTagsJson {
        content: content.to_string(),
        tags: entries.iter().map(tagged_to_json).collect(),
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        fields: entry.fields.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// `#name` for confirmed tags, `#name?` for pending suggestions
pub fn format_tagged(entry: &TaggedEntry) -> String {
    if entry.confirmed {
        format!("#{}", entry.tag.name)
    } else {
        format!("#{}?", entry.tag.name)
    }
}

/// One line per content item: `<content>: #a #b #c?`
pub fn format_content_line(content: &str, entries: &[TaggedEntry]) -> String {
    if entries.is_empty() {
        return format!("{}: (no tags)", content);
    }
    let tags: Vec<String> = entries.iter().map(format_tagged).collect();
    format!("{}: {}", content, tags.join(" "))
}

/// Registry listing line: `  3  rust` (auto-generated tags marked with `*`)
pub fn format_registry_line(tag: &Tag) -> String {
    let marker = if tag.auto_generated { "*" } else { " " };
    format!("{:>4} {}{}", tag.id.0, marker, tag.name)
}
