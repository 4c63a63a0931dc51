use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside `tagdeck/`
pub const LOCK_FILE: &str = ".lock";

/// How long a store writer waits for another `td` process
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory lock serializing store writers across processes.
///
/// The lock file is never unlinked, so all writers flock the same inode.
/// Released when the guard drops.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another td process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Lock `workspace_dir/.lock`, polling until `timeout` elapses.
    pub fn acquire(workspace_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = workspace_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let start = Instant::now();
        while try_lock(&file).is_err() {
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(FileLock { _file: file })
    }

    pub fn acquire_default(workspace_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(workspace_dir, DEFAULT_LOCK_TIMEOUT)
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
