//! In-memory table built from documents
//!
//! A [`Table`] is a list of named columns and a list of rows, each row
//! holding one [`Cell`] per column. Fragments are built from a single batch of
//! documents and concatenated into the final result.

use std::collections::HashMap;

use bson::Document;

use super::value::Value;
use crate::error::{FrameError, Result};

/// One table cell. `None` is the missing-value marker.
pub type Cell = Option<Value>;

/// Column-named, row-ordered table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from explicit columns and rows.
    ///
    /// # Arguments
    /// * `columns` - Column names
    /// * `rows` - Rows, each with exactly one cell per column
    ///
    /// # Returns
    /// * `Result<Table>` - Table or `FrameError::RowWidthMismatch`
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(FrameError::RowWidthMismatch {
                expected: columns.len(),
                found: row.len(),
            }
            .into());
        }
        Ok(Self { columns, rows })
    }

    /// Build a fragment from a batch of documents.
    ///
    /// Columns are the union of the documents' field names in first-seen
    /// order; a document lacking a field gets a missing cell there.
    ///
    /// # Arguments
    /// * `docs` - Documents in cursor order
    ///
    /// # Returns
    /// * `Result<Table>` - Fragment or error if a value cannot be represented
    pub fn from_documents(docs: &[Document]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sparse: Vec<Vec<(usize, Value)>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut cells = Vec::with_capacity(doc.len());
            for (key, bson) in doc {
                let position = match index.get(key) {
                    Some(&i) => i,
                    None => {
                        columns.push(key.clone());
                        index.insert(key.clone(), columns.len() - 1);
                        columns.len() - 1
                    }
                };
                cells.push((position, Value::from_bson(key, bson)?));
            }
            sparse.push(cells);
        }

        let width = columns.len();
        let rows = sparse
            .into_iter()
            .map(|cells| {
                let mut row: Vec<Cell> = vec![None; width];
                for (position, value) in cells {
                    row[position] = Some(value);
                }
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Concatenate tables row-wise, in order.
    ///
    /// The result's columns are the union of all inputs' columns in
    /// first-seen order. Rows are neither reordered nor deduplicated; cells
    /// for columns a fragment lacked are missing.
    pub fn concat(fragments: Vec<Table>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for fragment in &fragments {
            for name in &fragment.columns {
                if !index.contains_key(name) {
                    index.insert(name.clone(), columns.len());
                    columns.push(name.clone());
                }
            }
        }

        let width = columns.len();
        let total: usize = fragments.iter().map(Table::num_rows).sum();
        let mut rows = Vec::with_capacity(total);

        for fragment in fragments {
            let mapping: Vec<usize> = fragment.columns.iter().map(|name| index[name]).collect();
            let aligned = mapping.iter().enumerate().all(|(i, &target)| i == target)
                && fragment.columns.len() == width;

            for row in fragment.rows {
                if aligned {
                    rows.push(row);
                    continue;
                }
                let mut out: Vec<Cell> = vec![None; width];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    out[target] = cell;
                }
                rows.push(out);
            }
        }

        Self { columns, rows }
    }

    /// Remove a column if present.
    ///
    /// # Returns
    /// * `bool` - True if the column existed
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(position) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(position);
        for row in &mut self.rows {
            row.remove(position);
        }
        true
    }

    /// Replace every cell whose value is exactly one of `sentinels` with the
    /// missing-value marker.
    ///
    /// Only top-level string cells are compared; nested values and
    /// non-string cells are never touched.
    ///
    /// # Returns
    /// * `usize` - Number of cells replaced
    pub fn replace_sentinels<S: AsRef<str>>(&mut self, sentinels: &[S]) -> usize {
        let mut replaced = 0;
        for cell in self.rows.iter_mut().flatten() {
            let is_sentinel = cell
                .as_ref()
                .and_then(Value::as_str)
                .is_some_and(|s| sentinels.iter().any(|sentinel| sentinel.as_ref() == s));
            if is_sentinel {
                *cell = None;
                replaced += 1;
            }
        }
        replaced
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`.
    ///
    /// Returns `None` if the row or column does not exist; `Some(None)` for a
    /// missing cell.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let position = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[position])
    }

    /// All cells of a column, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let position = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[position]))
    }
}
