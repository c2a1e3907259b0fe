//! Compare-and-swap behaviour of the record stores under thread contention.

use hireflow_schema::HiringState;
use hireflow_store::{Attributes, FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
use std::sync::{Arc, Barrier};
use std::thread;

fn race_conditional_writes(store: Arc<dyn RecordStore>, contenders: usize) -> (usize, usize) {
    let record = store.create(Attributes::new(), HiringState::Added).unwrap();
    let barrier = Arc::new(Barrier::new(contenders));

    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let next = record.with_status(HiringState::InCheck);
            thread::spawn(move || {
                barrier.wait();
                store.put_if_status(&next, HiringState::Added)
            })
        })
        .collect();

    let mut won = 0;
    let mut lost = 0;
    for h in handles {
        match h.join().expect("writer thread must not panic") {
            Ok(()) => won += 1,
            Err(StoreError::StatusMismatch { .. }) => lost += 1,
            Err(e) => panic!("unexpected store error: {e}"),
        }
    }

    assert_eq!(store.get(record.id).unwrap().status, HiringState::InCheck);
    (won, lost)
}

#[test]
fn file_store_admits_exactly_one_conditional_writer() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn RecordStore> = Arc::new(FileRecordStore::open(dir.path()).unwrap());
    let (won, lost) = race_conditional_writes(store, 8);
    assert_eq!(won, 1);
    assert_eq!(lost, 7);
}

#[test]
fn memory_store_admits_exactly_one_conditional_writer() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let (won, lost) = race_conditional_writes(store, 8);
    assert_eq!(won, 1);
    assert_eq!(lost, 7);
}

#[test]
fn concurrent_creates_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileRecordStore::open(dir.path()).unwrap());

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .create(Attributes::new(), HiringState::Added)
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 6, "every create must receive its own id");
}
