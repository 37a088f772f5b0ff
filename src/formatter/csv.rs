//! CSV rendering
//!
//! Header row of column names followed by one line per row. Missing cells
//! are empty fields; values containing a comma, quote or line break are
//! quoted with inner quotes doubled.

use crate::frame::Table;

/// Render a table as CSV
pub fn render(table: &Table) -> String {
    if table.num_columns() == 0 {
        return String::new();
    }

    let mut out = String::new();
    push_line(&mut out, table.columns().iter().map(|c| escape_csv_value(c)));

    for row in table.rows() {
        push_line(
            &mut out,
            row.iter().map(|cell| match cell {
                Some(value) => escape_csv_value(&value.to_string()),
                None => String::new(),
            }),
        );
    }

    out
}

fn push_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let line: Vec<String> = fields.collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Escape a CSV value if necessary
fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_render_with_missing_cells() {
        let mut table = Table::from_documents(&[
            doc! { "name": "Alice", "status": "na" },
            doc! { "name": "Bob", "age": 30 },
        ])
        .unwrap();
        table.replace_sentinels(&["na"]);

        assert_eq!(render(&table), "name,status,age\nAlice,,\nBob,,30\n");
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render(&Table::empty()), "");
    }

    #[test]
    fn test_csv_escape_value() {
        assert_eq!(escape_csv_value("simple"), "simple");
        assert_eq!(escape_csv_value("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_value("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv_value("with\nnewline"), "\"with\nnewline\"");
    }
}
