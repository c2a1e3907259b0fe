use crate::layout::StoreLayout;
use crate::lock::StoreLock;
use crate::record::{Attributes, EmployeeRecord, Page, PageRequest};
use crate::{fsync_dir, write_atomic, RecordStore, StoreError};
use hireflow_schema::{EmployeeId, HiringState};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Sequence {
    last_id: u64,
}

/// Record store keeping one checksummed JSON file per employee.
///
/// Every mutation runs under the exclusive store lock, so `put_if_status`
/// is a true compare-and-swap even across processes sharing the directory.
/// Reads go straight to disk; writes are atomic via temp file + rename.
pub struct FileRecordStore {
    layout: StoreLayout,
}

impl FileRecordStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// Open (and initialize if needed) the store rooted at `root`.
    pub fn open(root: impl Into<std::path::PathBuf>) -> Result<Self, StoreError> {
        let layout = StoreLayout::new(root);
        layout.initialize()?;
        Ok(Self::new(layout))
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        StoreLock::acquire(&self.layout.lock_file())
    }

    fn write_record(&self, record: &EmployeeRecord) -> Result<(), StoreError> {
        let mut stored = record.clone();
        stored.checksum = Some(stored.compute_checksum()?);
        let content = serde_json::to_string_pretty(&stored)?;

        let dir = self.layout.records_dir();
        write_atomic(&dir, &self.layout.record_path(record.id), content.as_bytes())
    }

    fn read_record(&self, id: EmployeeId) -> Result<EmployeeRecord, StoreError> {
        let path = self.layout.record_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        let content = fs::read_to_string(&path)?;
        let record: EmployeeRecord = serde_json::from_str(&content)?;
        record.verify_checksum()?;
        Ok(record)
    }

    fn next_id(&self) -> Result<EmployeeId, StoreError> {
        let path = self.layout.sequence_file();
        let current = if path.exists() {
            serde_json::from_str::<Sequence>(&fs::read_to_string(&path)?)?
        } else {
            Sequence::default()
        };
        let next = Sequence {
            last_id: current.last_id + 1,
        };
        let content = serde_json::to_string(&next)?;
        write_atomic(&self.layout.store_dir(), &path, content.as_bytes())?;
        Ok(EmployeeId::new(next.last_id))
    }

    /// Identifiers of all record files, skipping anything that is not `<id>.json`.
    fn record_ids(&self) -> Result<Vec<EmployeeId>, StoreError> {
        let dir = self.layout.records_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            match stem.parse::<EmployeeId>() {
                Ok(id) => ids.push(id),
                Err(_) => debug!("ignoring stray file in records dir: {stem}.json"),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl RecordStore for FileRecordStore {
    fn create(
        &self,
        attributes: Attributes,
        initial: HiringState,
    ) -> Result<EmployeeRecord, StoreError> {
        let _lock = self.lock()?;
        let id = self.next_id()?;
        let record = EmployeeRecord::new(id, initial, attributes);
        self.write_record(&record)?;
        debug!("created employee {id} in state {initial}");
        self.read_record(id)
    }

    fn get(&self, id: EmployeeId) -> Result<EmployeeRecord, StoreError> {
        self.read_record(id)
    }

    fn put(&self, record: &EmployeeRecord) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        self.write_record(record)
    }

    fn put_if_status(
        &self,
        record: &EmployeeRecord,
        expected: HiringState,
    ) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let current = self.read_record(record.id)?;
        if current.status != expected {
            return Err(StoreError::StatusMismatch {
                id: record.id,
                expected,
                found: current.status,
            });
        }
        self.write_record(record)
    }

    fn delete(&self, id: EmployeeId) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let path = self.layout.record_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        fs::remove_file(&path)?;
        fsync_dir(&self.layout.records_dir())?;
        Ok(())
    }

    fn list(&self, page: PageRequest) -> Result<Page<EmployeeRecord>, StoreError> {
        let mut records = Vec::new();
        for id in self.record_ids()? {
            match self.read_record(id) {
                Ok(record) => records.push(record),
                // Deleted between the directory scan and the read.
                Err(StoreError::NotFound(_)) => {}
                Err(e) => warn!("skipping corrupted record {id}: {e}"),
            }
        }
        Ok(Page::from_sorted(records, page))
    }
}
