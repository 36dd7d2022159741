//! The worksheet: a sparse grid of styled cells plus view settings

use crate::cell::{Cell, CellAddress, CellRange, CellValue, Grid};
use crate::error::{Error, Result};
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

#[derive(Debug)]
pub struct Worksheet {
    name: String,
    grid: Grid,
    styles: StylePool,
    freeze_panes: Option<FreezePanes>,
}

/// Rows above `row` and columns left of `col` stay in view while scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    pub row: u32,
    pub col: u16,
}

impl Worksheet {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            grid: Grid::new(),
            styles: StylePool::new(),
            freeze_panes: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.grid.get(row, col)
    }

    /// Stored value at an A1 address; formulas come back as formulas
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.grid
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// The value a reader sees, with formulas replaced by their cached result.
    ///
    /// A formula pointing into another workbook fails with
    /// [`Error::ExternalReference`]; its cached result is still available
    /// from [`Worksheet::cached_value_at`].
    pub fn value_at(&self, row: u32, col: u16) -> Result<CellValue> {
        let Some(cell) = self.grid.get(row, col) else {
            return Ok(CellValue::Empty);
        };
        if cell.value.references_external_workbook() {
            return Err(Error::ExternalReference {
                address: CellAddress::new(row, col).to_string(),
                formula: cell.value.formula_text().unwrap_or_default().to_string(),
            });
        }
        Ok(cell.value.effective_value().clone())
    }

    /// Like [`Worksheet::value_at`] but never fails
    pub fn cached_value_at(&self, row: u32, col: u16) -> CellValue {
        self.grid
            .get(row, col)
            .map(|c| c.value.effective_value().clone())
            .unwrap_or_default()
    }

    pub fn cell_style_at(&self, row: u32, col: u16) -> Style {
        let index = self.grid.get(row, col).map_or(0, |c| c.style);
        self.styles.get(index).cloned().unwrap_or_default()
    }

    pub fn cell_style(&self, address: &str) -> Result<Style> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    /// Replace the value at an A1 address, keeping the style
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    pub fn set_cell_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        check_position(row, col)?;
        let value = value.into();
        self.grid.update(row, col, |cell| cell.value = value);
        Ok(())
    }

    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Store a formula without a result; the leading `=` is added if missing
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        let text = match formula.strip_prefix('=') {
            Some(_) => formula.to_string(),
            None => format!("={}", formula),
        };
        self.set_cell_value_at(row, col, CellValue::formula(text))
    }

    /// Record the last calculated result of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        let address = CellAddress::new(row, col);
        match self.grid.get_mut(row, col).map(|c| &mut c.value) {
            Some(CellValue::Formula { cached_value, .. }) => {
                *cached_value = Some(Box::new(value));
                Ok(())
            }
            _ => Err(Error::NotAFormula(address.to_string())),
        }
    }

    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        check_position(row, col)?;
        let index = self.styles.intern(style.clone());
        self.grid.update(row, col, |cell| cell.style = index);
        Ok(())
    }

    /// Edit a cell's style in place, leaving the facets `update` does not touch
    pub fn update_cell_style_at<F>(&mut self, row: u32, col: u16, update: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        let mut style = self.cell_style_at(row, col);
        update(&mut style);
        self.set_cell_style_at(row, col, &style)
    }

    /// Remove value and style
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.grid.remove(row, col);
    }

    /// Open `count` empty rows at `row`; everything from `row` down moves
    pub fn insert_rows(&mut self, row: u32, count: u32) -> Result<()> {
        check_position(row, 0)?;
        self.grid.insert_rows(row, count);
        Ok(())
    }

    pub fn delete_rows(&mut self, row: u32, count: u32) -> Result<()> {
        check_position(row, 0)?;
        self.grid.delete_rows(row, count);
        Ok(())
    }

    /// Stored cells of one row, left to right
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &Cell)> {
        self.grid.row(row)
    }

    pub fn last_column_in_row(&self, row: u32) -> Option<u16> {
        self.grid.row(row).last().map(|(col, _)| col)
    }

    /// Bounding range of the stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        let (rows, cols) = self.grid.bounds()?;
        Some(CellRange::from_indices(*rows.start(), *cols.start(), *rows.end(), *cols.end()))
    }

    pub fn freeze_panes(&self) -> Option<&FreezePanes> {
        self.freeze_panes.as_ref()
    }

    /// Freezing nothing (`0, 0`) removes the panes
    pub fn set_freeze_panes(&mut self, row: u32, col: u16) {
        self.freeze_panes = (row > 0 || col > 0).then_some(FreezePanes { row, col });
    }

    pub fn unfreeze_panes(&mut self) {
        self.freeze_panes = None;
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

fn check_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}
