use crate::record::{Attributes, EmployeeRecord, Page, PageRequest};
use crate::{RecordStore, StoreError};
use hireflow_schema::{EmployeeId, HiringState};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Records {
    by_id: BTreeMap<EmployeeId, EmployeeRecord>,
    last_id: u64,
}

/// Process-local record store. All operations take one mutex, which also
/// makes `put_if_status` atomic.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        // Every critical section below leaves the map consistent, so a
        // poisoned lock still guards valid data.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn create(
        &self,
        attributes: Attributes,
        initial: HiringState,
    ) -> Result<EmployeeRecord, StoreError> {
        let mut records = self.records();
        records.last_id += 1;
        let record = EmployeeRecord::new(EmployeeId::new(records.last_id), initial, attributes);
        records.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: EmployeeId) -> Result<EmployeeRecord, StoreError> {
        self.records()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn put(&self, record: &EmployeeRecord) -> Result<(), StoreError> {
        self.records().by_id.insert(record.id, record.clone());
        Ok(())
    }

    fn put_if_status(
        &self,
        record: &EmployeeRecord,
        expected: HiringState,
    ) -> Result<(), StoreError> {
        let mut records = self.records();
        let current = records
            .by_id
            .get_mut(&record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        if current.status != expected {
            return Err(StoreError::StatusMismatch {
                id: record.id,
                expected,
                found: current.status,
            });
        }
        *current = record.clone();
        Ok(())
    }

    fn delete(&self, id: EmployeeId) -> Result<(), StoreError> {
        self.records()
            .by_id
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self, page: PageRequest) -> Result<Page<EmployeeRecord>, StoreError> {
        let all: Vec<EmployeeRecord> = self.records().by_id.values().cloned().collect();
        Ok(Page::from_sorted(all, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get() {
        let store = MemoryRecordStore::new();
        let created = store.create(Attributes::new(), HiringState::Added).unwrap();
        assert_eq!(created.id, EmployeeId::new(1));
        assert_eq!(store.get(created.id).unwrap(), created);
    }

    #[test]
    fn ids_are_not_reused() {
        let store = MemoryRecordStore::new();
        let a = store.create(Attributes::new(), HiringState::Added).unwrap();
        store.delete(a.id).unwrap();
        let b = store.create(Attributes::new(), HiringState::Added).unwrap();
        assert_eq!(b.id, EmployeeId::new(2));
    }

    #[test]
    fn put_if_status_compares_and_swaps() {
        let store = MemoryRecordStore::new();
        let a = store.create(Attributes::new(), HiringState::Added).unwrap();
        let next = a.with_status(HiringState::InCheck);

        store.put_if_status(&next, HiringState::Added).unwrap();
        assert!(matches!(
            store.put_if_status(&next, HiringState::Added),
            Err(StoreError::StatusMismatch {
                found: HiringState::InCheck,
                ..
            })
        ));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let store = MemoryRecordStore::new();
        assert!(matches!(
            store.delete(EmployeeId::new(4)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn list_pages_in_id_order() {
        let store = MemoryRecordStore::new();
        for _ in 0..5 {
            store.create(Attributes::new(), HiringState::Added).unwrap();
        }
        let page = store.list(PageRequest::new(0, 2)).unwrap();
        let ids: Vec<u64> = page.items.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(page.total, 5);
    }
}
