//! Single-instance lock.

use crate::{Error, Result};
use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held for the lifetime of the process.
#[derive(Debug)]
pub struct AppLock {
    file: File,
    path: PathBuf,
}

impl AppLock {
    /// Take the lock without blocking.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        match file.try_lock() {
            Ok(()) => {
                tracing::debug!("Acquired lock {:?}", path);
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(TryLockError::WouldBlock) => Err(Error::AlreadyRunning(path.display().to_string())),
            Err(TryLockError::Error(e)) => Err(e.into()),
        }
    }
}

impl Drop for AppLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run").join("housekeeper.lock");

        let first = AppLock::acquire(&path).unwrap();
        assert!(matches!(AppLock::acquire(&path), Err(Error::AlreadyRunning(_))));

        drop(first);
        assert!(AppLock::acquire(&path).is_ok());
    }
}
