use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::error::StoreError;

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive writer lock on a store file.
///
/// The lock is a sibling file created with `create_new`; whoever creates it
/// owns the store until the guard drops and removes it.
#[derive(Debug)]
pub struct StoreLock {
    lock_path: PathBuf,
}

impl StoreLock {
    pub fn lock_path_for(store_path: &Path) -> PathBuf {
        let mut name = store_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".lock");
        store_path.with_file_name(name)
    }

    /// Waits up to `timeout` for the lock on `store_path`.
    pub fn acquire(store_path: &Path, timeout: Duration) -> Result<Self, StoreError> {
        let lock_path = Self::lock_path_for(store_path);
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(_) => return Ok(Self { lock_path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        tracing::warn!(path = ?lock_path, "timed out waiting for store lock");
                        return Err(StoreError::Locked { path: lock_path });
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("matches.json");

        let held = StoreLock::acquire(&store_path, Duration::from_millis(50)).unwrap();
        assert_eq!(held.path(), dir.path().join("matches.json.lock"));
        assert!(held.path().exists());

        let err = StoreLock::acquire(&store_path, Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, StoreError::Locked { .. }));
        assert!(err.is_recoverable());

        drop(held);
        assert!(!dir.path().join("matches.json.lock").exists());
        assert!(StoreLock::acquire(&store_path, Duration::from_millis(50)).is_ok());
    }
}
