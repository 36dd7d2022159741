//! Error types for the sheetbind helpers

use sheetbind_core::{CellAddress, CellError};
use thiserror::Error;

use crate::value::FieldKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while mapping records to and from worksheet rows
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the worksheet model (bad address, row out of bounds, ...)
    #[error(transparent)]
    Core(#[from] sheetbind_core::Error),

    /// Properties with no matching header column
    #[error("{type_name}: no header column found for {}", .missing.join(", "))]
    MissingMappings {
        type_name: &'static str,
        missing: Vec<String>,
    },

    /// A mapped cell holds a spreadsheet error value
    #[error("Cell {cell} (column '{column}', property '{property}') holds the error value {error}")]
    CellError {
        cell: CellAddress,
        column: String,
        property: String,
        error: CellError,
    },

    /// A cell value cannot be converted to the property's type
    #[error("Cell {cell} (column '{column}'): cannot convert '{value}' to {target} for property '{property}': {reason}")]
    Conversion {
        cell: CellAddress,
        column: String,
        property: String,
        target: FieldKind,
        value: String,
        reason: String,
    },

    /// Cell text does not parse as the property's type
    #[error("Cell {cell} (column '{column}'): '{text}' is not a valid {target} for property '{property}'")]
    Parse {
        cell: CellAddress,
        column: String,
        property: String,
        target: FieldKind,
        text: String,
    },

    /// A formula refers to another workbook and no cached value was accepted
    #[error("Cell {cell} (column '{column}', property '{property}'): {source}")]
    ExternalReference {
        cell: CellAddress,
        column: String,
        property: String,
        source: sheetbind_core::Error,
    },

    /// Row set shape or column type mismatch
    #[error("Invalid table: {0}")]
    Table(String),
}

impl Error {
    /// Cell the error refers to, if it came from a header-based read
    pub fn cell(&self) -> Option<CellAddress> {
        match self {
            Error::CellError { cell, .. }
            | Error::Conversion { cell, .. }
            | Error::Parse { cell, .. }
            | Error::ExternalReference { cell, .. } => Some(*cell),
            _ => None,
        }
    }
}
