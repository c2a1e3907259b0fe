use super::{describe, json_pretty, parse_id, print_record, CliWorkflow, EXIT_SUCCESS};

pub fn run(wf: &CliWorkflow, id: &str, json: bool) -> Result<u8, String> {
    let id = parse_id(id)?;
    let record = wf.get(id).map_err(|e| describe(&e))?;
    if json {
        println!("{}", json_pretty(&record)?);
    } else {
        print_record(&record);
        let next = wf.table().events_from(record.status);
        if !next.is_empty() {
            let names: Vec<&str> = next.iter().map(|e| e.trigger()).collect();
            println!("next events: {}", names.join(", "));
        }
    }
    Ok(EXIT_SUCCESS)
}
