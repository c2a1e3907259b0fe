use super::{describe, json_pretty, print_record, CliWorkflow, EXIT_SUCCESS};
use hireflow_store::Attributes;
use serde_json::Value;

pub fn run(
    wf: &CliWorkflow,
    attrs: &[String],
    attributes: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let attributes = build_attributes(attrs, attributes)?;
    let record = wf.create(attributes).map_err(|e| describe(&e))?;
    if json {
        println!("{}", json_pretty(&record)?);
    } else {
        println!("created employee {}", record.id);
        print_record(&record);
    }
    Ok(EXIT_SUCCESS)
}

/// `--attributes` first, then each `--attr key=value` on top.
fn build_attributes(attrs: &[String], object: Option<&str>) -> Result<Attributes, String> {
    let mut out = match object {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err("invalid input: --attributes must be a JSON object".to_owned()),
            Err(e) => return Err(format!("invalid input: --attributes is not valid JSON: {e}")),
        },
        None => Attributes::new(),
    };
    for pair in attrs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(format!("invalid input: expected KEY=VALUE, got '{pair}'"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("invalid input: empty attribute key in '{pair}'"));
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
        out.insert(key.to_owned(), value);
    }
    Ok(out)
}
