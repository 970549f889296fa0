pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys. Arrays are kept whole.
pub fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, val, out);
            }
        }
        _ => out.push((prefix.to_string(), value.clone())),
    }
}

/// Arrays of objects found while flattening, keyed by their dotted path.
pub fn object_arrays(rows: &[(String, Value)]) -> Vec<(&str, &[Value])> {
    rows.iter()
        .filter_map(|(key, val)| match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                Some((key.as_str(), items.as_slice()))
            }
            _ => None,
        })
        .collect()
}

pub fn envelope_result(value: &Value) -> Option<(&Value, &Map<String, Value>)> {
    let envelope = value.as_object()?;
    Some((envelope.get("result")?, envelope))
}
