use super::{json_pretty, EXIT_SUCCESS};
use hireflow_core::TransitionTable;
use hireflow_schema::{HireflowConfig, HiringState};
use std::path::Path;

pub fn run(config: &HireflowConfig, store_path: &Path, json: bool) -> Result<u8, String> {
    let table = TransitionTable::hiring().map_err(|e| format!("config error: {e}"))?;

    if json {
        let rules: Vec<_> = table
            .rules()
            .map(|r| {
                serde_json::json!({
                    "source": r.source,
                    "event": r.event,
                    "target": r.target,
                })
            })
            .collect();
        let terminal: Vec<HiringState> = HiringState::ALL
            .into_iter()
            .filter(|s| table.is_terminal(*s))
            .collect();
        let payload = serde_json::json!({
            "store": store_path,
            "default_page_size": config.default_page_size,
            "journal": config.journal,
            "initial": table.initial(),
            "terminal": terminal,
            "rules": rules,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("store:             {}", store_path.display());
        println!("default_page_size: {}", config.default_page_size);
        println!("journal:           {}", config.journal);
        println!("initial state:     {}", table.initial());
        println!("transitions:");
        for rule in table.rules() {
            let marker = if table.is_terminal(rule.target) {
                " (terminal)"
            } else {
                ""
            };
            println!(
                "  {:<9} --{}--> {}{marker}",
                rule.source.as_str(),
                rule.event,
                rule.target
            );
        }
        println!("workflow table OK");
    }
    Ok(EXIT_SUCCESS)
}
