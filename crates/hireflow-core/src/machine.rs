use crate::hooks::{AuditHook, HookChain, HookContext};
use crate::table::TransitionTable;
use hireflow_schema::{EmployeeId, HiringEvent, HiringState};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The engine's in-memory view of one employee's state.
///
/// An instance only carries a belief. It must be reconciled with the
/// persisted status before every dispatch; a stale instance refuses events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    id: EmployeeId,
    state: HiringState,
    stale: bool,
}

impl Instance {
    pub fn new(id: EmployeeId, seed: HiringState) -> Self {
        Self {
            id,
            state: seed,
            stale: true,
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn state(&self) -> HiringState {
        self.state
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Force the instance to the persisted status, whatever it believed.
    pub fn reconcile(&mut self, persisted: HiringState) {
        if self.state != persisted {
            debug!(
                "employee {}: instance believed {}, store says {persisted}",
                self.id, self.state
            );
        }
        self.state = persisted;
        self.stale = false;
    }

    /// Roll back an uncommitted change. The next use must reconcile again.
    pub fn discard(&mut self, prior: HiringState) {
        self.state = prior;
        self.stale = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The table has no rule for `(from, event)`.
    NoTransition,
    /// The instance was not reconciled with the store.
    NotReconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event '{event}' rejected in state {from}: {reason}")]
pub struct Rejected {
    pub from: HiringState,
    pub event: HiringEvent,
    pub reason: RejectReason,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoTransition => write!(f, "no transition defined"),
            RejectReason::NotReconciled => write!(f, "instance not reconciled with store"),
        }
    }
}

/// Dispatches events against instances using a shared transition table.
pub struct StateMachine {
    table: Arc<TransitionTable>,
    hooks: HookChain,
}

impl StateMachine {
    pub fn new(table: TransitionTable) -> Self {
        Self {
            table: Arc::new(table),
            hooks: HookChain::new(),
        }
    }

    #[must_use]
    pub fn with_hook(mut self, hook: impl AuditHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn add_hook(&mut self, hook: impl AuditHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub(crate) fn hooks(&self) -> &HookChain {
        &self.hooks
    }

    /// Apply `event` to `instance`, firing the state-change hooks around the
    /// change. A rejected event leaves the instance untouched.
    pub fn dispatch(
        &self,
        instance: &mut Instance,
        event: HiringEvent,
    ) -> Result<HiringState, Rejected> {
        let from = instance.state();
        if instance.is_stale() {
            return Err(Rejected {
                from,
                event,
                reason: RejectReason::NotReconciled,
            });
        }
        let Some(to) = self.table.allowed(from, event) else {
            return Err(Rejected {
                from,
                event,
                reason: RejectReason::NoTransition,
            });
        };

        let ctx = HookContext {
            id: instance.id(),
            event,
            from,
            to: Some(to),
        };
        self.hooks.before_state_change(&ctx);
        instance.state = to;
        self.hooks.after_state_change(&ctx);
        Ok(to)
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("rules", &self.table.rules().count())
            .field("hooks", &self.hooks)
            .finish()
    }
}
