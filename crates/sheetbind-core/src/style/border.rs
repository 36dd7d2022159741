//! Cell borders

use super::Color;
use crate::cell::{CellAddress, CellRange};

/// One of the four sides of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [
        BorderSide::Left,
        BorderSide::Right,
        BorderSide::Top,
        BorderSide::Bottom,
    ];

    /// Sides of `addr` that lie on the outline of `range`
    pub fn on_outline(range: &CellRange, addr: &CellAddress) -> Vec<BorderSide> {
        Self::ALL
            .into_iter()
            .filter(|side| match side {
                BorderSide::Left => addr.col == range.start.col,
                BorderSide::Right => addr.col == range.end.col,
                BorderSide::Top => addr.row == range.start.row,
                BorderSide::Bottom => addr.row == range.end.row,
            })
            .collect()
    }
}

/// Line drawn on one side of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderEdge {
    pub style: BorderLineStyle,
    pub color: Color,
}

impl BorderEdge {
    pub fn new(style: BorderLineStyle, color: Color) -> Self {
        Self { style, color }
    }
}

/// Borders of a cell; `None` means no line on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// The same line on every side
    pub fn all(edge: BorderEdge) -> Self {
        Self {
            left: Some(edge),
            right: Some(edge),
            top: Some(edge),
            bottom: Some(edge),
        }
    }

    pub fn get(&self, side: BorderSide) -> Option<BorderEdge> {
        match side {
            BorderSide::Left => self.left,
            BorderSide::Right => self.right,
            BorderSide::Top => self.top,
            BorderSide::Bottom => self.bottom,
        }
    }

    /// Draw (or with `None`, clear) one side
    pub fn set(&mut self, side: BorderSide, edge: Option<BorderEdge>) {
        let slot = match side {
            BorderSide::Left => &mut self.left,
            BorderSide::Right => &mut self.right,
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
        };
        // a `None` line style draws nothing
        *slot = edge.filter(|e| e.style != BorderLineStyle::None);
    }

    pub fn is_empty(&self) -> bool {
        BorderSide::ALL.iter().all(|side| self.get(*side).is_none())
    }
}

/// Line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderLineStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    /// Thinnest line Excel draws
    Hair,
}
