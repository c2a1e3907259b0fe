//! Durable employee records for hireflow.
//!
//! This crate provides the storage layer: the `RecordStore` trait the workflow
//! core consumes, the `EmployeeRecord` it stores, `FileRecordStore` (one
//! checksummed JSON file per record with atomic writes and an exclusive
//! `StoreLock` around every mutation), `MemoryRecordStore` for embedding and
//! tests, and `StoreLayout` for directory structure management.

pub mod file;
pub mod layout;
pub mod lock;
pub mod memory;
pub mod record;

pub use file::FileRecordStore;
pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use lock::StoreLock;
pub use memory::MemoryRecordStore;
pub use record::{Attributes, EmployeeRecord, Page, PageRequest};

use hireflow_schema::{EmployeeId, HiringState};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// POSIX does not guarantee a rename is durable until the parent directory
/// itself has been synced.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// Replace `dest` (inside `dir`) with `content` so that readers see either
/// the old file or the new one, never a partial write.
pub(crate) fn write_atomic(dir: &Path, dest: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(dir)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("status of employee {id} changed concurrently: expected {expected}, found {found}")]
    StatusMismatch {
        id: EmployeeId,
        expected: HiringState,
        found: HiringState,
    },
    #[error("integrity check failed for employee {id}: expected {expected}, got {actual}")]
    IntegrityFailure {
        id: EmployeeId,
        expected: String,
        actual: String,
    },
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
}

/// Keyed CRUD over employee records.
///
/// `put_if_status` is the conditional write the workflow relies on for
/// same-identifier serialization across writers: it must compare and swap
/// atomically with respect to every other mutation of the same store.
pub trait RecordStore: Send + Sync {
    /// Assign a fresh identifier and persist a record in `initial` state.
    fn create(&self, attributes: Attributes, initial: HiringState)
        -> Result<EmployeeRecord, StoreError>;

    fn get(&self, id: EmployeeId) -> Result<EmployeeRecord, StoreError>;

    /// Unconditional write.
    fn put(&self, record: &EmployeeRecord) -> Result<(), StoreError>;

    /// Write `record` only if the stored status still equals `expected`.
    fn put_if_status(
        &self,
        record: &EmployeeRecord,
        expected: HiringState,
    ) -> Result<(), StoreError>;

    fn delete(&self, id: EmployeeId) -> Result<(), StoreError>;

    /// Records ordered by identifier.
    fn list(&self, page: PageRequest) -> Result<Page<EmployeeRecord>, StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn create(
        &self,
        attributes: Attributes,
        initial: HiringState,
    ) -> Result<EmployeeRecord, StoreError> {
        (**self).create(attributes, initial)
    }

    fn get(&self, id: EmployeeId) -> Result<EmployeeRecord, StoreError> {
        (**self).get(id)
    }

    fn put(&self, record: &EmployeeRecord) -> Result<(), StoreError> {
        (**self).put(record)
    }

    fn put_if_status(
        &self,
        record: &EmployeeRecord,
        expected: HiringState,
    ) -> Result<(), StoreError> {
        (**self).put_if_status(record, expected)
    }

    fn delete(&self, id: EmployeeId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn list(&self, page: PageRequest) -> Result<Page<EmployeeRecord>, StoreError> {
        (**self).list(page)
    }
}
