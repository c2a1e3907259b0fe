//! Workflow core for the hireflow hiring lifecycle.
//!
//! This crate ties the fixed transition table, the state machine engine and
//! the record store together into the `Workflow`: the single mutation entry
//! point, which rebuilds an engine instance from the persisted status,
//! dispatches one event, and writes the result back with a conditional write.
//! It also provides the per-identifier instance registry, audit hooks, and
//! cancellation plumbing.

pub mod concurrency;
pub mod hooks;
pub mod machine;
pub mod registry;
pub mod table;
pub mod workflow;

pub use concurrency::{install_signal_handler, shutdown_requested, CancelToken};
pub use hooks::{
    AuditHook, EventOutcome, HookChain, HookContext, HookResult, JournalAudit, JournalEntry,
    TracingAudit,
};
pub use machine::{Instance, RejectReason, Rejected, StateMachine};
pub use registry::InstanceRegistry;
pub use table::{Rule, StateKind, TransitionTable, WorkflowDeclaration, HIRING_WORKFLOW};
pub use workflow::Workflow;

use hireflow_schema::{EmployeeId, HiringEvent, HiringState, SchemaError};
use hireflow_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("invalid transition: event '{event}' is not allowed in state {from}")]
    InvalidTransition {
        from: HiringState,
        event: HiringEvent,
    },
    #[error("conflict on employee {id}: expected status {expected}, found {found}")]
    Conflict {
        id: EmployeeId,
        expected: HiringState,
        found: HiringState,
    },
    #[error("failed to persist new status of employee {id}: {source}")]
    PersistenceFailure {
        id: EmployeeId,
        #[source]
        source: StoreError,
    },
    #[error("invalid workflow configuration: {0}")]
    Configuration(String),
    #[error("operation cancelled before commit")]
    Cancelled,
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether repeating the whole call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Conflict { .. } | CoreError::PersistenceFailure { .. }
        )
    }
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => CoreError::NotFound(id),
            other => CoreError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let e: CoreError = StoreError::NotFound(EmployeeId::new(8)).into();
        assert!(matches!(e, CoreError::NotFound(id) if id == EmployeeId::new(8)));
    }

    #[test]
    fn other_store_errors_stay_store_errors() {
        let e: CoreError = StoreError::LockFailed("busy".to_owned()).into();
        assert!(matches!(e, CoreError::Store(_)));
        assert!(e.to_string().starts_with("store error:"));
    }

    #[test]
    fn invalid_transition_display_names_state_and_event() {
        let e = CoreError::InvalidTransition {
            from: HiringState::Approved,
            event: HiringEvent::Approve,
        };
        let msg = e.to_string();
        assert!(msg.contains("APPROVED"));
        assert!(msg.contains("approve"));
    }

    #[test]
    fn retryable_kinds() {
        let conflict = CoreError::Conflict {
            id: EmployeeId::new(1),
            expected: HiringState::Added,
            found: HiringState::InCheck,
        };
        let persistence = CoreError::PersistenceFailure {
            id: EmployeeId::new(1),
            source: StoreError::LockFailed("x".to_owned()),
        };
        assert!(conflict.is_retryable());
        assert!(persistence.is_retryable());
        assert!(!CoreError::NotFound(EmployeeId::new(1)).is_retryable());
        assert!(!CoreError::Configuration("bad".to_owned()).is_retryable());
        assert!(!CoreError::InvalidTransition {
            from: HiringState::Added,
            event: HiringEvent::Approve,
        }
        .is_retryable());
    }
}
