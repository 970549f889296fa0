use serde_json::Value;

use super::TableSource;

pub fn run_rates(tables: &TableSource) -> Result<Value, Box<dyn std::error::Error>> {
    let table = tables.load()?;
    Ok(serde_json::to_value(table)?)
}
