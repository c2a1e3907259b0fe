use super::{colorize_state, json_pretty, parse_id, EXIT_SUCCESS};
use hireflow_core::JournalAudit;
use hireflow_store::StoreLayout;
use std::path::Path;

pub fn run(store_path: &Path, id: Option<&str>, json: bool) -> Result<u8, String> {
    let filter = id.map(parse_id).transpose()?;
    let journal = StoreLayout::new(store_path).journal_file();
    let entries: Vec<_> = JournalAudit::read(&journal)
        .map_err(|e| format!("store error: {e}"))?
        .into_iter()
        .filter(|entry| filter.is_none_or(|id| entry.id == id))
        .collect();

    if json {
        println!("{}", json_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("no recorded state changes");
    } else {
        for entry in &entries {
            println!(
                "{}  employee {:<6} {:<12} {} -> {}",
                entry.at,
                entry.id,
                entry.event.trigger(),
                colorize_state(entry.from),
                colorize_state(entry.to)
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
