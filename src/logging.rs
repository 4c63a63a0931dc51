use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter
pub const LOG_ENV: &str = "TAGDECK_LOG";

/// Log file inside `tagdeck/` used while the terminal editor owns the screen
pub const TUI_LOG_FILE: &str = "td.log";

/// Build the filter: `TAGDECK_LOG` wins over the configured directive.
/// With `tui_mode` the console gets nothing at all, since any byte written to
/// stderr lands on the editor's alternate screen.
pub fn build_filter(configured: &str, verbose: bool, tui_mode: bool) -> EnvFilter {
    if tui_mode {
        return EnvFilter::new("off");
    }
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    if verbose {
        return EnvFilter::new("tagdeck=debug");
    }
    EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("tagdeck=info"))
}

pub fn tui_log_path(workspace_dir: &Path) -> PathBuf {
    workspace_dir.join(TUI_LOG_FILE)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Subscriber writing plain (no ANSI) lines to `file`
fn file_subscriber(
    file: File,
    filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .finish()
}

/// Install the global subscriber writing to stderr. Calling it twice is a no-op.
pub fn init_logging(configured: &str, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(build_filter(configured, verbose, false))
        .try_init();
}

/// Install the subscriber for the terminal editor: events go to
/// `tagdeck/td.log`, never to the console.
pub fn init_tui_logging(configured: &str, verbose: bool, workspace_dir: &Path) {
    match open_log_file(&tui_log_path(workspace_dir)) {
        Ok(file) => {
            let subscriber = file_subscriber(file, build_filter(configured, verbose, false));
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(build_filter(configured, verbose, true))
                .try_init();
        }
    }
}
