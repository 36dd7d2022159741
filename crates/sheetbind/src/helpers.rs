//! Cell and style helpers on [`Worksheet`]
//!
//! [`WorksheetExt`] collects the one-line conveniences (typed values, number
//! formats, fills, borders, freeze panes) together with the record writer
//! and reader, so a single import brings the whole API into scope.

use sheetbind_core::{
    BorderEdge, BorderLineStyle, BorderSide, CellAddress, CellRange, CellValue, Color,
    NumberFormat, Style, Worksheet,
};

use crate::convert::{self, ConvertOptions};
use crate::error::Result;
use crate::populate::{self, PopulateHooks};
use crate::record::Record;
use crate::table::{DataRow, RowSet};
use crate::value::FieldValue;

/// Extension trait for Worksheet adding the sheetbind helpers
pub trait WorksheetExt {
    /// Set a cell value by address; `None` clears the value
    fn set_value<V: Into<FieldValue>>(&mut self, address: &str, value: V) -> Result<()>;

    /// Set a cell value by row and column indices
    fn set_value_at<V: Into<FieldValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()>;

    /// Set a cell formula (a leading `=` is optional)
    fn set_formula(&mut self, address: &str, formula: &str) -> Result<()>;

    /// Set the number format of one cell
    fn set_number_format(&mut self, address: &str, format: &str) -> Result<()>;

    /// Set the number format of every cell in a range
    fn set_range_number_format(&mut self, range: &str, format: &str) -> Result<()>;

    /// Fill one cell with a solid color
    fn set_background(&mut self, address: &str, color: Color) -> Result<()>;

    /// Fill every cell in a range with a solid color
    fn set_range_background(&mut self, range: &str, color: Color) -> Result<()>;

    /// Draw every edge of every cell in a range
    fn set_borders(&mut self, range: &str, line: BorderLineStyle, color: Color) -> Result<()>;

    /// Draw the outer edges of a range only
    fn set_outline(&mut self, range: &str, line: BorderLineStyle, color: Color) -> Result<()>;

    /// Freeze the top `rows` rows and the left `cols` columns
    fn freeze(&mut self, rows: u32, cols: u16);

    /// Remove frozen panes
    fn unfreeze(&mut self);

    /// Write records at a template row, see [`populate::populate`]
    fn populate<'r, T, I, H>(&mut self, template_row: u32, records: I, hooks: &mut H) -> Result<Option<u32>>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
        H: PopulateHooks<T> + ?Sized;

    /// Write a row set at a template row, see [`populate::populate_rows`]
    fn populate_rows<'s, R, H>(&mut self, template_row: u32, rows: &'s R, hooks: &mut H) -> Result<Option<u32>>
    where
        R: RowSet + ?Sized,
        H: PopulateHooks<DataRow<'s, R>> + ?Sized;

    /// Read the rows below the header row as records, see [`convert::convert_to`]
    fn convert_to<T: Record>(&self, options: &ConvertOptions<'_>) -> Result<Vec<T>>;
}

impl WorksheetExt for Worksheet {
    fn set_value<V: Into<FieldValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    fn set_value_at<V: Into<FieldValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        self.set_cell_value_at(row, col, CellValue::from(value.into()))?;
        Ok(())
    }

    fn set_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        self.set_cell_formula(address, formula)?;
        Ok(())
    }

    fn set_number_format(&mut self, address: &str, format: &str) -> Result<()> {
        self.set_range_number_format(address, format)
    }

    fn set_range_number_format(&mut self, range: &str, format: &str) -> Result<()> {
        let format = NumberFormat::from_string(format);
        update_range(self, range, |style, _| style.number_format = format.clone())
    }

    fn set_background(&mut self, address: &str, color: Color) -> Result<()> {
        self.set_range_background(address, color)
    }

    fn set_range_background(&mut self, range: &str, color: Color) -> Result<()> {
        update_range(self, range, |style, _| style.background = Some(color))
    }

    fn set_borders(&mut self, range: &str, line: BorderLineStyle, color: Color) -> Result<()> {
        let edge = Some(BorderEdge::new(line, color));
        update_range(self, range, |style, _| {
            for side in BorderSide::ALL {
                style.border.set(side, edge);
            }
        })
    }

    fn set_outline(&mut self, range: &str, line: BorderLineStyle, color: Color) -> Result<()> {
        let edge = Some(BorderEdge::new(line, color));
        let bounds = CellRange::parse(range)?;
        update_range(self, range, |style, addr| {
            for side in BorderSide::on_outline(&bounds, &addr) {
                style.border.set(side, edge);
            }
        })
    }

    fn freeze(&mut self, rows: u32, cols: u16) {
        self.set_freeze_panes(rows, cols);
    }

    fn unfreeze(&mut self) {
        self.unfreeze_panes();
    }

    fn populate<'r, T, I, H>(&mut self, template_row: u32, records: I, hooks: &mut H) -> Result<Option<u32>>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
        H: PopulateHooks<T> + ?Sized,
    {
        populate::populate(self, template_row, records, hooks)
    }

    fn populate_rows<'s, R, H>(&mut self, template_row: u32, rows: &'s R, hooks: &mut H) -> Result<Option<u32>>
    where
        R: RowSet + ?Sized,
        H: PopulateHooks<DataRow<'s, R>> + ?Sized,
    {
        populate::populate_rows(self, template_row, rows, hooks)
    }

    fn convert_to<T: Record>(&self, options: &ConvertOptions<'_>) -> Result<Vec<T>> {
        convert::convert_to(self, options)
    }
}

/// Apply a style change to every cell of an A1 range, keeping the other facets
fn update_range<F>(sheet: &mut Worksheet, range: &str, mut update: F) -> Result<()>
where
    F: FnMut(&mut Style, CellAddress),
{
    let range = CellRange::parse(range)?;
    for addr in range.cells() {
        sheet.update_cell_style_at(addr.row, addr.col, |style| update(style, addr))?;
    }
    Ok(())
}
