//! ASCII table rendering using tabled
//!
//! - Builder pattern for dynamic schemas
//! - Missing cells shown as `NaN`
//! - Configurable styles and column width with wrapping

use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::config::TableStyle;
use crate::frame::{Cell, Table, Value};

/// Maximum width for a single column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Text shown for a missing cell
pub const MISSING_MARKER: &str = "NaN";

/// Table formatter for exported tables
pub struct TableFormatter {
    /// Maximum column width
    max_column_width: usize,

    /// Table style
    style: TableStyle,

    /// Enable colored output
    use_colors: bool,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Modern,
            use_colors: false,
        }
    }

    /// Enable or disable header colors
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the table style
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Set maximum column width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width.max(1);
        self
    }

    /// Format a table
    ///
    /// # Arguments
    /// * `table` - Table to render
    ///
    /// # Returns
    /// * `String` - Rendered table
    pub fn format(&self, table: &Table) -> String {
        if table.num_columns() == 0 {
            return "(empty result set)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(table.columns().iter().cloned());
        for row in table.rows() {
            builder.push_record(row.iter().map(format_cell));
        }

        let mut rendered = builder.build();
        match self.style {
            TableStyle::Modern => rendered.with(Style::modern()),
            TableStyle::Ascii => rendered.with(Style::ascii()),
            TableStyle::Rounded => rendered.with(Style::rounded()),
            TableStyle::Markdown => rendered.with(Style::markdown()),
            TableStyle::Psql => rendered.with(Style::psql()),
        };

        // Wrap long values instead of truncating them
        for i in 0..table.num_columns() {
            rendered.with(Modify::new(Columns::new(i..=i)).with(Width::wrap(self.max_column_width)));
        }

        rendered.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            rendered.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        rendered.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Text for one cell
fn format_cell(cell: &Cell) -> String {
    match cell {
        None => MISSING_MARKER.to_string(),
        Some(Value::Array(items)) if items.len() > 3 => format!("[Array({})]", items.len()),
        Some(Value::Document(fields)) if fields.len() > 2 => format!("{{Object({})}}", fields.len()),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn sample() -> Table {
        Table::from_documents(&[
            doc! { "name": "Alice", "age": 25 },
            doc! { "name": "Bob" },
        ])
        .unwrap()
    }

    #[test]
    fn test_format_empty_table() {
        let result = TableFormatter::new().format(&Table::empty());
        assert_eq!(result, "(empty result set)");
    }

    #[test]
    fn test_format_rows_and_missing_cells() {
        let result = TableFormatter::new().format(&sample());
        assert!(result.contains("name"));
        assert!(result.contains("age"));
        assert!(result.contains("Alice"));
        assert!(result.contains("Bob"));
        assert!(result.contains("25"));
        assert!(result.contains(MISSING_MARKER));
    }

    #[test]
    fn test_with_style() {
        let result = TableFormatter::new()
            .with_style(TableStyle::Ascii)
            .format(&sample());
        assert!(result.contains("+"));
        assert!(result.contains("|"));
    }

    #[test]
    fn test_large_nested_values_are_summarized() {
        let cell = Some(Value::Array(vec![Value::Int(1); 5]));
        assert_eq!(format_cell(&cell), "[Array(5)]");

        let small = Some(Value::Document(vec![("x".into(), Value::Int(1))]));
        assert_eq!(format_cell(&small), r#"{"x":1}"#);
    }

    #[test]
    fn test_with_max_column_width() {
        let formatter = TableFormatter::new().with_max_column_width(0);
        assert_eq!(formatter.max_column_width, 1);
    }
}
