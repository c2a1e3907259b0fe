use crate::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Exclusive advisory lock on the store, released on drop.
///
/// Each acquisition opens its own file description, so threads of one
/// process contend on it exactly like separate processes do. A
/// read-compare-write done while holding it is atomic with respect to every
/// other `FileRecordStore` writer on the same directory.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Block until the lock at `path` is held.
    pub fn acquire(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            debug!("store lock {} is busy, waiting", path.display());
            file.lock_exclusive()
                .map_err(|e| StoreError::LockFailed(format!("{}: {e}", path.display())))?;
        }
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
