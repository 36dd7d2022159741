//! Database-style row sets for the template writer

use crate::error::{Error, Result};
use crate::value::{FieldKind, FieldValue};

/// Tabular source with named columns, addressed by row and column index
pub trait RowSet {
    /// Column names, in column order
    fn column_names(&self) -> Vec<&str>;

    /// Number of rows
    fn row_count(&self) -> usize;

    /// Value at a row and column index; `Null` when out of range
    fn value(&self, row: usize, column: usize) -> FieldValue;
}

/// One row of a [`RowSet`], handed to the writer hooks
#[derive(Debug)]
pub struct DataRow<'a, R: ?Sized> {
    table: &'a R,
    index: usize,
}

// Manual impls: `R` itself need not be `Clone`/`Copy`
impl<R: ?Sized> Clone for DataRow<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for DataRow<'_, R> {}

impl<'a, R: RowSet + ?Sized> DataRow<'a, R> {
    pub(crate) fn new(table: &'a R, index: usize) -> Self {
        Self { table, index }
    }

    /// Position of the row in its row set
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value at a column index
    pub fn value(&self, column: usize) -> FieldValue {
        self.table.value(self.index, column)
    }

    /// Value of a named column (exact name)
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        let column = self.table.column_names().iter().position(|c| *c == name)?;
        Some(self.value(column))
    }
}

/// Column of a [`DataTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    pub name: String,
    pub kind: FieldKind,
}

/// In-memory row set with typed columns
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<DataColumn>,
    rows: Vec<Vec<FieldValue>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column; existing rows get `Null` in it
    pub fn add_column<S: Into<String>>(&mut self, name: S, kind: FieldKind) -> &mut Self {
        self.columns.push(DataColumn {
            name: name.into(),
            kind,
        });
        for row in &mut self.rows {
            row.push(FieldValue::Null);
        }
        self
    }

    /// Builder form of [`add_column`](Self::add_column)
    pub fn with_column<S: Into<String>>(mut self, name: S, kind: FieldKind) -> Self {
        self.add_column(name, kind);
        self
    }

    /// Append a row; every value must be `Null` or of its column's kind
    pub fn add_row(&mut self, values: Vec<FieldValue>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::Table(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (value, column) in values.iter().zip(&self.columns) {
            match value.kind() {
                Some(kind) if kind != column.kind => {
                    return Err(Error::Table(format!(
                        "column '{}' holds {} values, got {}",
                        column.name, column.kind, kind
                    )));
                }
                _ => {}
            }
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    /// Iterate over the rows
    pub fn rows(&self) -> impl Iterator<Item = DataRow<'_, Self>> {
        (0..self.rows.len()).map(move |index| DataRow::new(self, index))
    }
}

impl RowSet for DataTable {
    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, column: usize) -> FieldValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default()
    }
}
