use super::{colorize_state, describe, json_pretty, CliWorkflow, EXIT_SUCCESS};
use hireflow_store::PageRequest;

pub fn run(wf: &CliWorkflow, page: usize, size: usize, json: bool) -> Result<u8, String> {
    let result = wf
        .list(PageRequest::new(page, size))
        .map_err(|e| describe(&e))?;
    if json {
        println!("{}", json_pretty(&result)?);
    } else if result.items.is_empty() {
        if result.total == 0 {
            println!("no employees found");
        } else {
            println!("page {} is empty ({} employees in total)", result.page, result.total);
        }
    } else {
        println!("{:<8} {:<10} {:<26} NAME", "ID", "STATUS", "UPDATED");
        for record in &result.items {
            let name = record
                .attributes
                .get("name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("");
            // Pad before colouring; escape codes would break the width.
            let status = format!("{:<10}", record.status.as_str());
            let status = status.replace(
                record.status.as_str(),
                &colorize_state(record.status),
            );
            println!(
                "{:<8} {status} {:<26} {name}",
                record.id, record.updated_at
            );
        }
        println!(
            "page {}/{} ({} employees)",
            result.page + 1,
            result.total_pages().max(1),
            result.total
        );
    }
    Ok(EXIT_SUCCESS)
}
