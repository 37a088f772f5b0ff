//! Output formatting for exported tables
//!
//! - ASCII tables via tabled
//! - CSV
//! - JSON Lines
//! - A one-line summary

pub mod csv;
pub mod jsonl;
pub mod table;

pub use table::TableFormatter;

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::Result;
use crate::frame::Table;

/// Main formatter for exported tables
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Renderer used for the table format
    table: TableFormatter,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            table: TableFormatter::new().with_colors(use_colors),
        }
    }

    /// Create a formatter from display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            format_type: config.format,
            table: TableFormatter::new()
                .with_colors(config.color_output)
                .with_style(config.style)
                .with_max_column_width(config.max_column_width),
        }
    }

    pub fn format_type(&self) -> OutputFormat {
        self.format_type
    }

    /// Format a table in the configured format
    ///
    /// # Arguments
    /// * `table` - Table to format
    ///
    /// # Returns
    /// * `Result<String>` - Formatted output or error
    pub fn format(&self, table: &Table) -> Result<String> {
        match self.format_type {
            OutputFormat::Table => Ok(self.table.format(table)),
            OutputFormat::Csv => Ok(csv::render(table)),
            OutputFormat::Jsonl => jsonl::render(table),
            OutputFormat::Summary => Ok(summarize(table)),
        }
    }
}

/// Row and column counts plus the column names
fn summarize(table: &Table) -> String {
    let mut summary = format!(
        "{} row(s) x {} column(s)",
        table.num_rows(),
        table.num_columns()
    );
    if table.num_columns() > 0 {
        summary.push_str(&format!("\ncolumns: {}", table.columns().join(", ")));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_summary() {
        let table = Table::from_documents(&[doc! { "a": 1, "b": 2 }]).unwrap();
        let output = Formatter::new(OutputFormat::Summary, false)
            .format(&table)
            .unwrap();
        assert_eq!(output, "1 row(s) x 2 column(s)\ncolumns: a, b");

        let empty = Formatter::new(OutputFormat::Summary, false)
            .format(&Table::empty())
            .unwrap();
        assert_eq!(empty, "0 row(s) x 0 column(s)");
    }

    #[test]
    fn test_from_config_dispatches_format() {
        let config = DisplayConfig {
            format: OutputFormat::Csv,
            ..DisplayConfig::default()
        };
        let formatter = Formatter::from_config(&config);
        assert_eq!(formatter.format_type(), OutputFormat::Csv);

        let table = Table::from_documents(&[doc! { "x": "y" }]).unwrap();
        assert_eq!(formatter.format(&table).unwrap(), "x\ny\n");
    }
}
