use std::fs;
use std::path::{Path, PathBuf};

use crate::io::file_store::FileStore;
use crate::io::recovery::atomic_write;
use crate::model::{Config, OwnerId};
use crate::store::StoreError;

/// Name of the directory holding config, store and logs
pub const WORKSPACE_DIR: &str = "tagdeck";

const CONFIG_TEMPLATE: &str = r##"[owner]
# Whose tag registry this workspace edits
id = {owner}

[editor]
# Cap on tags per content item. Remove the line for no limit.
# max_tags = 10
# Repeated add requests within this window collapse into the first one
add_debounce_ms = 300
read_only = false

[store]
# Snapshot file, relative to tagdeck/
file = "store.json"

[log]
# tracing filter; the TAGDECK_LOG environment variable overrides it
filter = "tagdeck=info"
"##;

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a tagdeck workspace: no tagdeck/ directory found (try `td init`)")]
    NotAWorkspace,
    #[error("tagdeck/ already exists at {0} (use --force to overwrite the config)")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A loaded workspace: root, tagdeck/ directory and parsed config
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub dir: PathBuf,
    pub config: Config,
}

impl Workspace {
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.config.owner.id.clone())
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.dir, &self.config.store.file)
    }
}

/// Discover the workspace by walking up from `start`, looking for a
/// `tagdeck/config.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(WORKSPACE_DIR);
        if dir.is_dir() && dir.join("config.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let dir = root.join(WORKSPACE_DIR);
    if !dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config_path = dir.join("config.toml");
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        dir,
        config,
    })
}

/// Create `tagdeck/` under `root` with a default config and an empty store.
pub fn init_workspace(root: &Path, owner: &str, force: bool) -> Result<Workspace, WorkspaceError> {
    let dir = root.join(WORKSPACE_DIR);
    if dir.join("config.toml").exists() && !force {
        return Err(WorkspaceError::AlreadyExists(root.to_path_buf()));
    }
    fs::create_dir_all(&dir)?;

    let owner_value = toml::Value::String(owner.to_string()).to_string();
    let text = CONFIG_TEMPLATE.replace("{owner}", &owner_value);
    let config: Config = toml::from_str(&text)?;
    atomic_write(&dir.join("config.toml"), text.as_bytes())?;

    let workspace = Workspace {
        root: root.to_path_buf(),
        dir,
        config,
    };
    workspace.store().init()?;
    Ok(workspace)
}
