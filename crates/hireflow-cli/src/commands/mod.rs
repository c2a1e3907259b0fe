pub mod check_config;
pub mod create;
pub mod delete;
pub mod get;
pub mod history;
pub mod list;
pub mod transition;

use hireflow_core::{CoreError, JournalAudit, Workflow};
use hireflow_schema::{EmployeeId, HireflowConfig, HiringState};
use hireflow_store::{EmployeeRecord, FileRecordStore};
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;
pub const EXIT_CONFIG_ERROR: u8 = 4;

pub type CliWorkflow = Workflow<FileRecordStore>;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn colorize_state(state: HiringState) -> String {
    use console::Style;
    let style = match state {
        HiringState::Added => Style::new().yellow(),
        HiringState::InCheck => Style::new().cyan().bold(),
        HiringState::Approved => Style::new().green(),
        HiringState::Rejected => Style::new().red(),
    };
    style.apply_to(state.as_str()).to_string()
}

/// Render a core error with the prefix `main` uses to pick an exit code.
pub fn describe(e: &CoreError) -> String {
    match e {
        CoreError::PersistenceFailure { .. } | CoreError::Io(_) | CoreError::Serialization(_) => {
            format!("store error: {e}")
        }
        CoreError::Schema(_) => format!("invalid input: {e}"),
        CoreError::Configuration(_) => format!("config error: {e}"),
        _ => e.to_string(),
    }
}

pub fn parse_id(input: &str) -> Result<EmployeeId, String> {
    input.parse().map_err(|e| format!("invalid input: {e}"))
}

pub fn open_workflow(store_path: &Path, config: &HireflowConfig) -> Result<CliWorkflow, String> {
    let store = FileRecordStore::open(store_path).map_err(|e| format!("store error: {e}"))?;
    let journal = store.layout().journal_file();
    let wf = Workflow::new(store).map_err(|e| describe(&e))?;
    Ok(if config.journal {
        wf.with_hook(JournalAudit::new(journal))
    } else {
        wf
    })
}

pub fn print_record(record: &EmployeeRecord) {
    println!("id:          {}", record.id);
    println!("status:      {}", colorize_state(record.status));
    if record.attributes.is_empty() {
        println!("attributes:  (none)");
    } else {
        println!("attributes:");
        for (key, value) in &record.attributes {
            match value {
                serde_json::Value::String(s) => println!("  {key}: {s}"),
                other => println!("  {key}: {other}"),
            }
        }
    }
    println!("created_at:  {}", record.created_at);
    println!("updated_at:  {}", record.updated_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_schema::HiringEvent;

    #[test]
    fn json_pretty_serializes_object() {
        let val = serde_json::json!({"status": "ADDED"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"status\""));
        assert!(result.contains("\"ADDED\""));
    }

    #[test]
    fn colorize_state_keeps_state_name() {
        for state in HiringState::ALL {
            assert!(colorize_state(state).contains(state.as_str()));
        }
    }

    #[test]
    fn describe_prefixes_by_kind() {
        let invalid = CoreError::InvalidTransition {
            from: HiringState::Added,
            event: HiringEvent::Approve,
        };
        assert!(describe(&invalid).starts_with("invalid transition:"));
        assert!(describe(&CoreError::Configuration("x".to_owned())).starts_with("config error:"));
        assert!(describe(&CoreError::NotFound(EmployeeId::new(3))).starts_with("employee not found"));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id("12").unwrap(), EmployeeId::new(12));
        assert!(parse_id("twelve").unwrap_err().starts_with("invalid input:"));
    }

    #[test]
    fn open_workflow_initializes_store() {
        let dir = tempfile::tempdir().unwrap();
        let wf = open_workflow(dir.path(), &HireflowConfig::default()).unwrap();
        assert!(dir.path().join("store").exists());
        assert_eq!(wf.table().initial(), HiringState::Added);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_FAILURE,
            EXIT_INVALID_INPUT,
            EXIT_STORE_ERROR,
            EXIT_CONFIG_ERROR,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
