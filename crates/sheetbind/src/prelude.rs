//! Prelude module - common imports for sheetbind users
//!
//! ```rust
//! use sheetbind::prelude::*;
//! ```

pub use crate::{
    // Style types
    BorderLineStyle,
    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    Color,
    // Reader
    ConvertOptions,
    DataTable,
    // Error types
    Error,
    FieldKind,
    FieldValue,
    // Writer
    NoHooks,
    PopulateHooks,
    // Records
    Record,
    Result,
    RowSet,
    Worksheet,
    // Extension traits
    WorksheetExt,
};
