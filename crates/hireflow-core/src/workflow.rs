use crate::concurrency::CancelToken;
use crate::hooks::{AuditHook, EventOutcome, HookContext, TracingAudit};
use crate::machine::{Instance, RejectReason, StateMachine};
use crate::registry::InstanceRegistry;
use crate::table::TransitionTable;
use crate::CoreError;
use hireflow_schema::{EmployeeId, HiringEvent, HiringState};
use hireflow_store::{Attributes, EmployeeRecord, Page, PageRequest, RecordStore, StoreError};
use tracing::{debug, info, warn};

/// The hiring workflow: the only path through which an employee's status
/// changes.
///
/// Every event is applied against a freshly reconciled engine instance and
/// written back with a conditional write on the status it was read with, so
/// the stored record and the engine never disagree about a committed state.
pub struct Workflow<S: RecordStore> {
    store: S,
    machine: StateMachine,
    registry: InstanceRegistry,
    cancel: CancelToken,
}

impl<S: RecordStore> Workflow<S> {
    /// Build a workflow over `store` with the hiring table and tracing audit.
    ///
    /// Fails with `CoreError::Configuration` if the table does not validate.
    pub fn new(store: S) -> Result<Self, CoreError> {
        let table = TransitionTable::hiring()?;
        Ok(Self::with_table(store, table).with_hook(TracingAudit))
    }

    /// Build a workflow with an already validated table and no hooks.
    pub fn with_table(store: S, table: TransitionTable) -> Self {
        Self {
            store,
            machine: StateMachine::new(table),
            registry: InstanceRegistry::new(),
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_hook(mut self, hook: impl AuditHook + 'static) -> Self {
        self.machine.add_hook(hook);
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn table(&self) -> &TransitionTable {
        self.machine.table()
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Persist a new employee in the initial state.
    pub fn create(&self, attributes: Attributes) -> Result<EmployeeRecord, CoreError> {
        let record = self.store.create(attributes, self.table().initial())?;
        info!("created employee {} in state {}", record.id, record.status);
        Ok(record)
    }

    pub fn get(&self, id: EmployeeId) -> Result<EmployeeRecord, CoreError> {
        Ok(self.store.get(id)?)
    }

    pub fn list(&self, page: PageRequest) -> Result<Page<EmployeeRecord>, CoreError> {
        Ok(self.store.list(page)?)
    }

    /// Remove an employee. Waits for any in-flight event on the same id.
    pub fn delete(&self, id: EmployeeId) -> Result<(), CoreError> {
        self.registry
            .with_instance(id, self.table().initial(), |_| self.store.delete(id))?;
        info!("deleted employee {id}");
        Ok(())
    }

    pub fn start_check(&self, id: EmployeeId) -> Result<HiringState, CoreError> {
        self.apply_event(id, HiringEvent::StartCheck)
    }

    pub fn approve(&self, id: EmployeeId) -> Result<HiringState, CoreError> {
        self.apply_event(id, HiringEvent::Approve)
    }

    pub fn reject(&self, id: EmployeeId) -> Result<HiringState, CoreError> {
        self.apply_event(id, HiringEvent::Reject)
    }

    /// Parse an external trigger name (`start-check`, `approve`, `reject`)
    /// and apply it.
    pub fn apply_trigger(&self, id: EmployeeId, trigger: &str) -> Result<HiringState, CoreError> {
        let event = HiringEvent::from_trigger(trigger)?;
        self.apply_event(id, event)
    }

    /// Apply one event to the employee `id` and persist the result.
    ///
    /// The persisted status always wins over whatever the engine instance
    /// believed before the call. A concurrent writer that changes the status
    /// between the read and the write makes this call fail with
    /// `CoreError::Conflict` instead of overwriting it.
    pub fn apply_event(&self, id: EmployeeId, event: HiringEvent) -> Result<HiringState, CoreError> {
        self.registry
            .with_instance(id, self.table().initial(), |instance| {
                self.apply_in_slot(instance, event)
            })
    }

    fn apply_in_slot(
        &self,
        instance: &mut Instance,
        event: HiringEvent,
    ) -> Result<HiringState, CoreError> {
        let id = instance.id();
        let record = self.store.get(id)?;
        instance.reconcile(record.status);

        let hooks = self.machine.hooks();
        let mut ctx = HookContext::new(id, event, record.status);
        hooks.before_event(&ctx);

        let result = self.transition(instance, &record, event);
        if let Ok(to) = result {
            ctx.to = Some(to);
        }
        hooks.after_event(&ctx, EventOutcome::of(&result));
        result
    }

    fn transition(
        &self,
        instance: &mut Instance,
        record: &EmployeeRecord,
        event: HiringEvent,
    ) -> Result<HiringState, CoreError> {
        let id = record.id;
        let from = record.status;

        self.checkpoint(id)?;

        let to = self.machine.dispatch(instance, event).map_err(|rejected| {
            if rejected.reason == RejectReason::NotReconciled {
                warn!("employee {id}: dispatch on an unreconciled instance");
            }
            debug!("employee {id}: {rejected}");
            CoreError::InvalidTransition {
                from: rejected.from,
                event: rejected.event,
            }
        })?;

        if let Err(e) = self.checkpoint(id) {
            instance.discard(from);
            return Err(e);
        }

        match self.store.put_if_status(&record.with_status(to), from) {
            Ok(()) => Ok(to),
            Err(StoreError::StatusMismatch {
                expected, found, ..
            }) => {
                instance.discard(from);
                debug!("employee {id}: conflict, status moved from {expected} to {found}");
                Err(CoreError::Conflict {
                    id,
                    expected,
                    found,
                })
            }
            Err(StoreError::NotFound(_)) => {
                instance.discard(from);
                Err(CoreError::NotFound(id))
            }
            Err(source) => {
                instance.discard(from);
                warn!("employee {id}: failed to persist {from} -> {to}: {source}");
                Err(CoreError::PersistenceFailure { id, source })
            }
        }
    }

    fn checkpoint(&self, id: EmployeeId) -> Result<(), CoreError> {
        if self.cancel.should_stop() {
            debug!("employee {id}: cancelled before commit");
            return Err(CoreError::Cancelled);
        }
        Ok(())
    }
}

impl<S: RecordStore> std::fmt::Debug for Workflow<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("machine", &self.machine)
            .field("active", &self.registry.active())
            .finish_non_exhaustive()
    }
}
