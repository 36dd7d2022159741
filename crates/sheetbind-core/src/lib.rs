//! # sheetbind-core
//!
//! The in-memory worksheet the sheetbind helpers write to and read from:
//! typed [`CellValue`]s in a sparse grid, interned [`Style`]s, row
//! insertion and deletion, and freeze panes. Rows and columns are 0-based.
//!
//! ```rust
//! use sheetbind_core::{CellValue, Worksheet};
//!
//! let mut sheet = Worksheet::new("Data");
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("World")).unwrap();
//!
//! sheet.insert_rows(1, 1).unwrap();
//! assert_eq!(sheet.get_value("A3").unwrap().as_string(), Some("World"));
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod worksheet;

pub use cell::{Cell, CellAddress, CellError, CellKind, CellRange, CellValue};
pub use error::{Error, Result};
pub use style::{BorderEdge, BorderLineStyle, BorderSide, BorderStyle, Color, NumberFormat, Style};
pub use worksheet::{FreezePanes, Worksheet};

/// Rows per sheet in the xlsx format
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns per sheet in the xlsx format (`A` to `XFD`)
pub const MAX_COLS: u16 = 16_384;
