//! Shared vocabulary for the hireflow workspace.
//!
//! This crate defines the schema layer: the `EmployeeId` identifier, the fixed
//! `HiringState` and `HiringEvent` enumerations with their external trigger
//! names, and `HireflowConfig`, the TOML configuration file read by the CLI.

pub mod config;
pub mod hiring;
pub mod types;

pub use config::{default_config_path, HireflowConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use hiring::{HiringEvent, HiringState};
pub use types::EmployeeId;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown event trigger '{0}', expected one of: start-check, approve, reject")]
    UnknownTrigger(String),
    #[error("unknown hiring state '{0}'")]
    UnknownState(String),
    #[error("invalid employee id '{0}': expected a non-negative integer")]
    InvalidId(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Config(String),
}
