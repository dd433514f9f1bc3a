//! Lock file guarding a read-modify-write cycle on the data file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};

/// Locks older than this are considered abandoned.
const LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Path of the lock file for `path`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Acquire an exclusive lock on a file.
pub fn acquire_lock(path: &Path) -> Result<LockHandle> {
    let lock_path = lock_path(path);

    if lock_path.exists() {
        let modified = lock_path.metadata()?.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age < LOCK_TIMEOUT {
            return Err(Error::Lock(format!(
                "Lock file is held: {}",
                lock_path.display()
            )));
        }

        tracing::warn!("Removing stale lock: {}", lock_path.display());
        std::fs::remove_file(&lock_path).ok();
    }

    let mut lock_file = File::options()
        .write(true)
        .create_new(true)
        .open(&lock_path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                Error::Lock(format!("Lock file is held: {}", lock_path.display()))
            }
            _ => Error::Io(e),
        })?;
    lock_file.write_all(format!("{}\n", std::process::id()).as_bytes())?;
    lock_file.sync_all()?;

    tracing::debug!("Acquired lock: {}", lock_path.display());

    Ok(LockHandle { lock_path })
}

/// Lock handle - releases lock when dropped.
#[derive(Debug)]
pub struct LockHandle {
    lock_path: PathBuf,
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            tracing::warn!("Failed to release lock {}: {}", self.lock_path.display(), e);
        } else {
            tracing::debug!("Released lock: {}", self.lock_path.display());
        }
    }
}

/// Acquire lock, execute function, release lock.
pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _lock = acquire_lock(path)?;
    f()
}
