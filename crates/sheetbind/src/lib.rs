//! # sheetbind
//!
//! Helpers for moving typed records in and out of worksheets.
//!
//! - [`WorksheetExt`] - Typed cell values, number formats, fills, borders, freeze panes
//! - [`populate`](populate::populate) - Write records or row sets using a template row
//! - [`convert_to`](convert::convert_to) - Read rows into records using the header row
//! - [`Record`] and [`record!`] - The property table both directions rely on
//!
//! ## Example
//!
//! ```rust
//! use sheetbind::prelude::*;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Order {
//!     id: u32,
//!     customer: String,
//!     amount: f64,
//! }
//!
//! sheetbind::record!(Order {
//!     id: u32,
//!     customer: String,
//!     amount: f64,
//! });
//!
//! let mut sheet = Worksheet::new("Orders");
//! sheet.set_value("A1", "id").unwrap();
//! sheet.set_value("B1", "customer").unwrap();
//! sheet.set_value("C1", "amount").unwrap();
//! sheet.set_value("A2", "{id}").unwrap();
//! sheet.set_value("B2", "{customer}").unwrap();
//! sheet.set_value("C2", "{amount}").unwrap();
//!
//! let orders = vec![
//!     Order { id: 1, customer: "Acme".into(), amount: 120.5 },
//!     Order { id: 2, customer: "Globex".into(), amount: 80.0 },
//! ];
//! sheet.populate(1, &orders, &mut NoHooks).unwrap();
//! sheet.freeze(1, 0);
//!
//! let read: Vec<Order> = sheet.convert_to(&ConvertOptions::default()).unwrap();
//! assert_eq!(read, orders);
//! ```

pub mod coerce;
pub mod convert;
pub mod error;
pub mod helpers;
pub mod populate;
pub mod prelude;
pub mod record;
pub mod table;
pub mod value;

pub use coerce::{coerce_cell, CoerceError, DEFAULT_DATE_FORMATS};
pub use convert::{
    convert_to, resolve_columns, ColumnMapping, ConvertOptions, ExternalReference,
    DEFAULT_BLANK_ROWS_TO_STOP, DEFAULT_MAX_COLUMNS,
};
pub use error::{Error, Result};
pub use helpers::WorksheetExt;
pub use populate::{populate, populate_rows, NoHooks, PopulateHooks, UNMAPPED_MARKER};
pub use record::{FieldDef, Record};
pub use table::{DataColumn, DataRow, DataTable, RowSet};
pub use value::{FieldKind, FieldType, FieldValue};

// Re-export the worksheet model
pub use sheetbind_core::{
    BorderEdge, BorderLineStyle, BorderSide, BorderStyle, CellAddress, CellError, CellKind, CellRange,
    CellValue, Color, FreezePanes, NumberFormat, Style, Worksheet, MAX_COLS, MAX_ROWS,
};
