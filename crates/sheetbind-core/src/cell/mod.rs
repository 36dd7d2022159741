//! Cell values, addresses and the sparse grid holding them

mod address;
mod grid;
mod serial;
mod value;

pub use address::{CellAddress, CellRange};
pub use grid::{Cell, Grid};
pub use serial::{datetime_from_serial, datetime_to_serial, duration_from_days, duration_to_days};
pub use value::{format_duration, CellError, CellKind, CellValue};
