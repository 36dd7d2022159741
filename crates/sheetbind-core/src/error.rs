//! Worksheet errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),

    #[error("invalid cell range {0}")]
    InvalidRange(String),

    /// Index, then the largest allowed index
    #[error("row {0} is past the last row {1}")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is past the last column {1}")]
    ColumnOutOfBounds(u16, u16),

    #[error("cell {0} holds no formula")]
    NotAFormula(String),

    /// Formula into another workbook; only its cached value can be read
    #[error("cell {address}: references to other workbooks cannot be resolved ({formula})")]
    ExternalReference { address: String, formula: String },
}

impl Error {
    pub fn is_external_reference(&self) -> bool {
        matches!(self, Error::ExternalReference { .. })
    }
}
