use crate::machine::Instance;
use hireflow_schema::{EmployeeId, HiringState};
use std::collections::HashMap;
use std::sync::{Arc, LockResult, Mutex, MutexGuard, PoisonError};

type Slot = Arc<Mutex<Instance>>;

/// One engine instance per employee id, shared by every caller in the
/// process.
///
/// Callers for the same id are serialized on the instance's mutex; callers
/// for different ids never wait on each other beyond the brief map lookup.
/// A slot is dropped once its last in-flight user returns, so the registry
/// only holds instances that are currently in use.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    slots: Mutex<HashMap<EmployeeId, Slot>>,
}

fn relock<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    // Instances are reconciled from the store on every use, so a poisoned
    // one is still safe to hand out.
    result.unwrap_or_else(PoisonError::into_inner)
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the instance for `id`.
    ///
    /// A fresh instance is created in `seed` state (marked stale) if no
    /// caller currently holds one.
    pub fn with_instance<R>(
        &self,
        id: EmployeeId,
        seed: HiringState,
        f: impl FnOnce(&mut Instance) -> R,
    ) -> R {
        let slot = {
            let mut slots = relock(self.slots.lock());
            Arc::clone(
                slots
                    .entry(id)
                    .or_insert_with(|| Arc::new(Mutex::new(Instance::new(id, seed)))),
            )
        };

        let result = {
            let mut instance = relock(slot.lock());
            f(&mut instance)
        };

        self.release(id, &slot);
        result
    }

    fn release(&self, id: EmployeeId, slot: &Slot) {
        let mut slots = relock(self.slots.lock());
        // One reference in the map, one held by this caller.
        if Arc::strong_count(slot) <= 2 {
            if let Some(current) = slots.get(&id) {
                if Arc::ptr_eq(current, slot) {
                    slots.remove(&id);
                }
            }
        }
    }

    /// Number of ids with an in-flight caller.
    pub fn active(&self) -> usize {
        relock(self.slots.lock()).len()
    }
}
