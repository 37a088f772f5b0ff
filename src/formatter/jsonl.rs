//! JSON Lines rendering
//!
//! One JSON object per row, keyed by column name. Missing cells are `null`.

use serde_json::{Map, Value as JsonValue};

use crate::error::{MongoframeError, Result};
use crate::frame::Table;

/// Render a table as JSON Lines
pub fn render(table: &Table) -> Result<String> {
    let mut out = String::new();

    for row in table.rows() {
        let object: Map<String, JsonValue> = table
            .columns()
            .iter()
            .zip(row)
            .map(|(column, cell)| {
                let value = cell.as_ref().map_or(JsonValue::Null, |v| v.to_json());
                (column.clone(), value)
            })
            .collect();

        let line = serde_json::to_string(&JsonValue::Object(object))
            .map_err(|e| MongoframeError::Generic(format!("Failed to serialize row: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }

    Ok(out)
}
