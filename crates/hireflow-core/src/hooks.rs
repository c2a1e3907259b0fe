//! Audit hooks: ordered observers invoked at four fixed points of every
//! transition attempt.
//!
//! Hooks observe, they never veto. A hook returning an error is logged and
//! skipped; the remaining hooks still run and the transition proceeds. The
//! caller is never told that an audit hook failed.
//!
//! | point                 | fired by        | `to`                     |
//! |-----------------------|-----------------|--------------------------|
//! | `before_event`        | `Workflow`      | `None`                   |
//! | `before_state_change` | `StateMachine`  | target state             |
//! | `after_state_change`  | `StateMachine`  | target state             |
//! | `after_event`         | `Workflow`      | target state if applied  |
//!
//! `after_event` runs once the outcome is known, i.e. after the conditional
//! write, so it is the point to use for anything that must only see
//! committed changes.

use crate::CoreError;
use fs2::FileExt;
use hireflow_schema::{EmployeeId, HiringEvent, HiringState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookContext {
    pub id: EmployeeId,
    pub event: HiringEvent,
    pub from: HiringState,
    pub to: Option<HiringState>,
}

impl HookContext {
    pub fn new(id: EmployeeId, event: HiringEvent, from: HiringState) -> Self {
        Self {
            id,
            event,
            from,
            to: None,
        }
    }
}

/// How a transition attempt ended, as seen by `after_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied(HiringState),
    Rejected,
    Conflict,
    Cancelled,
    Failed,
}

impl EventOutcome {
    pub(crate) fn of(result: &Result<HiringState, CoreError>) -> Self {
        match result {
            Ok(state) => EventOutcome::Applied(*state),
            Err(CoreError::InvalidTransition { .. }) => EventOutcome::Rejected,
            Err(CoreError::Conflict { .. }) => EventOutcome::Conflict,
            Err(CoreError::Cancelled) => EventOutcome::Cancelled,
            Err(_) => EventOutcome::Failed,
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Applied(state) => write!(f, "applied ({state})"),
            EventOutcome::Rejected => write!(f, "rejected"),
            EventOutcome::Conflict => write!(f, "conflict"),
            EventOutcome::Cancelled => write!(f, "cancelled"),
            EventOutcome::Failed => write!(f, "failed"),
        }
    }
}

pub trait AuditHook: Send + Sync {
    /// Name used when logging hook failures.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn before_event(&self, _ctx: &HookContext) -> HookResult {
        Ok(())
    }

    fn before_state_change(&self, _ctx: &HookContext) -> HookResult {
        Ok(())
    }

    fn after_state_change(&self, _ctx: &HookContext) -> HookResult {
        Ok(())
    }

    fn after_event(&self, _ctx: &HookContext, _outcome: EventOutcome) -> HookResult {
        Ok(())
    }
}

/// Hooks in registration order.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn AuditHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Box<dyn AuditHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    fn run(&self, point: &str, id: EmployeeId, call: impl Fn(&dyn AuditHook) -> HookResult) {
        for hook in &self.hooks {
            if let Err(e) = call(hook.as_ref()) {
                warn!(
                    "audit hook '{}' failed at {point} for employee {id}: {e}",
                    hook.name()
                );
            }
        }
    }

    pub fn before_event(&self, ctx: &HookContext) {
        self.run("before-event", ctx.id, |h| h.before_event(ctx));
    }

    pub fn before_state_change(&self, ctx: &HookContext) {
        self.run("before-state-change", ctx.id, |h| h.before_state_change(ctx));
    }

    pub fn after_state_change(&self, ctx: &HookContext) {
        self.run("after-state-change", ctx.id, |h| h.after_state_change(ctx));
    }

    pub fn after_event(&self, ctx: &HookContext, outcome: EventOutcome) {
        self.run("after-event", ctx.id, |h| h.after_event(ctx, outcome));
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| h.name()))
            .finish()
    }
}

/// Logs every hook point through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl AuditHook for TracingAudit {
    fn name(&self) -> &str {
        "tracing"
    }

    fn before_event(&self, ctx: &HookContext) -> HookResult {
        debug!(
            "employee {}: received event '{}' in state {}",
            ctx.id, ctx.event, ctx.from
        );
        Ok(())
    }

    fn before_state_change(&self, ctx: &HookContext) -> HookResult {
        if let Some(to) = ctx.to {
            debug!("employee {}: leaving {} for {to}", ctx.id, ctx.from);
        }
        Ok(())
    }

    fn after_state_change(&self, ctx: &HookContext) -> HookResult {
        if let Some(to) = ctx.to {
            info!(
                "employee {}: state changed (from: {}, to: {to})",
                ctx.id, ctx.from
            );
        }
        Ok(())
    }

    fn after_event(&self, ctx: &HookContext, outcome: EventOutcome) -> HookResult {
        debug!(
            "employee {}: event '{}' finished: {outcome}",
            ctx.id, ctx.event
        );
        Ok(())
    }
}

/// One committed state change in the audit journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: String,
    pub id: EmployeeId,
    pub event: HiringEvent,
    pub from: HiringState,
    pub to: HiringState,
}

/// Appends a JSON line per committed transition to a journal file.
///
/// Writes only from `after_event` with an `Applied` outcome, so the journal
/// never lists a change the record store did not accept.
#[derive(Debug, Clone)]
pub struct JournalAudit {
    path: PathBuf,
}

impl JournalAudit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &JournalEntry) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        let written = file.write_all(line.as_bytes()).and_then(|()| file.sync_data());
        let _ = file.unlock();
        written?;
        Ok(())
    }

    /// Read every well-formed entry. A missing journal reads as empty.
    pub fn read(path: &Path) -> Result<Vec<JournalEntry>, CoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        let mut entries = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping malformed journal line {}: {e}", n + 1),
            }
        }
        Ok(entries)
    }
}

impl AuditHook for JournalAudit {
    fn name(&self) -> &str {
        "journal"
    }

    fn after_event(&self, ctx: &HookContext, outcome: EventOutcome) -> HookResult {
        if let EventOutcome::Applied(to) = outcome {
            self.append(&JournalEntry {
                at: chrono::Utc::now().to_rfc3339(),
                id: ctx.id,
                event: ctx.event,
                from: ctx.from,
                to,
            })?;
        }
        Ok(())
    }
}
