use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an employee sits in the hiring workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HiringState {
    Added,
    InCheck,
    Approved,
    Rejected,
}

impl HiringState {
    pub const ALL: [HiringState; 4] = [
        HiringState::Added,
        HiringState::InCheck,
        HiringState::Approved,
        HiringState::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HiringState::Added => "ADDED",
            HiringState::InCheck => "IN_CHECK",
            HiringState::Approved => "APPROVED",
            HiringState::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for HiringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HiringState {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s).replace('-', "_").to_ascii_uppercase();
        HiringState::ALL
            .into_iter()
            .find(|state| state.as_str() == key)
            .ok_or_else(|| SchemaError::UnknownState(s.to_owned()))
    }
}

/// A business event requesting a state change.
///
/// Each event has an external trigger name (`start-check`, `approve`,
/// `reject`) used by entry points such as the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HiringEvent {
    StartCheck,
    Approve,
    Reject,
}

impl HiringEvent {
    pub const ALL: [HiringEvent; 3] = [
        HiringEvent::StartCheck,
        HiringEvent::Approve,
        HiringEvent::Reject,
    ];

    /// The external trigger name mapped to this event.
    pub fn trigger(self) -> &'static str {
        match self {
            HiringEvent::StartCheck => "start-check",
            HiringEvent::Approve => "approve",
            HiringEvent::Reject => "reject",
        }
    }

    /// Map an external trigger name onto an event.
    ///
    /// Matching is case-insensitive and accepts `_` in place of `-`.
    pub fn from_trigger(name: &str) -> Result<Self, SchemaError> {
        let key = normalize(name);
        HiringEvent::ALL
            .into_iter()
            .find(|event| event.trigger() == key)
            .ok_or_else(|| SchemaError::UnknownTrigger(name.to_owned()))
    }
}

impl fmt::Display for HiringEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.trigger())
    }
}

impl FromStr for HiringEvent {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_trigger(s)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}
