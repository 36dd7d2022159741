//! The formatting facets a cell can carry: background, borders, number format

mod border;
mod color;
mod number_format;
mod pool;

pub use border::{BorderEdge, BorderLineStyle, BorderSide, BorderStyle};
pub use color::Color;
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Formatting of one cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Solid background fill, `None` for no fill
    pub background: Option<Color>,
    pub border: BorderStyle,
    pub number_format: NumberFormat,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_number_format<S: Into<String>>(mut self, code: S) -> Self {
        self.number_format = NumberFormat::from_string(code);
        self
    }

    /// No facet differs from the default
    pub fn is_default(&self) -> bool {
        self.background.is_none() && self.border.is_empty() && self.number_format == NumberFormat::General
    }
}
