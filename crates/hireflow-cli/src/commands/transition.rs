use super::{colorize_state, describe, json_pretty, parse_id, CliWorkflow, EXIT_SUCCESS};

/// Apply the event named by `trigger` and report the new status.
pub fn run(wf: &CliWorkflow, id: &str, trigger: &str, json: bool) -> Result<u8, String> {
    let id = parse_id(id)?;
    let status = wf.apply_trigger(id, trigger).map_err(|e| describe(&e))?;
    if json {
        let payload = serde_json::json!({
            "id": id,
            "event": trigger,
            "status": status,
            "terminal": wf.table().is_terminal(status),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("employee {id}: {}", colorize_state(status));
    }
    Ok(EXIT_SUCCESS)
}
