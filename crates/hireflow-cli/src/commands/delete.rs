use super::{describe, json_pretty, parse_id, CliWorkflow, EXIT_SUCCESS};

pub fn run(wf: &CliWorkflow, id: &str, json: bool) -> Result<u8, String> {
    let id = parse_id(id)?;
    wf.delete(id).map_err(|e| describe(&e))?;
    if json {
        let payload = serde_json::json!({ "id": id, "deleted": true });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("deleted employee {id}");
    }
    Ok(EXIT_SUCCESS)
}
