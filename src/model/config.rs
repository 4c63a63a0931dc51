use serde::{Deserialize, Serialize};

/// Configuration from tagdeck/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub owner: OwnerConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Owner whose tag registry the workspace operates on
    #[serde(default = "default_owner")]
    pub id: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        OwnerConfig {
            id: default_owner(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of tags per content item. Absent = unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tags: Option<usize>,
    /// Window in which repeated add requests collapse into the first one
    #[serde(default = "default_add_debounce_ms")]
    pub add_debounce_ms: u64,
    #[serde(default)]
    pub read_only: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            max_tags: None,
            add_debounce_ms: default_add_debounce_ms(),
            read_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file, relative to the tagdeck/ directory
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file: default_store_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing-subscriber filter directive, overridden by TAGDECK_LOG
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: default_log_filter(),
        }
    }
}

fn default_owner() -> String {
    "me".to_string()
}

fn default_add_debounce_ms() -> u64 {
    300
}

fn default_store_file() -> String {
    "store.json".to_string()
}

fn default_log_filter() -> String {
    "tagdeck=info".to_string()
}
