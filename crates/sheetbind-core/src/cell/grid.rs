//! Sparse cell grid
//!
//! Cells live in one ordered map keyed by `(row, col)`, so iteration is
//! row-major and row shifts are a single `split_off`.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::CellValue;
use crate::MAX_ROWS;

/// A stored cell: its value and an index into the sheet's style pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    /// 0 is the default style
    pub style: u32,
}

impl Cell {
    fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style == 0
    }
}

#[derive(Debug, Default)]
pub struct Grid {
    cells: BTreeMap<(u32, u16), Cell>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, col))
    }

    /// Change a cell in place; a cell left without value or style is dropped
    pub fn update<F: FnOnce(&mut Cell)>(&mut self, row: u32, col: u16, change: F) {
        let mut cell = self.cells.remove(&(row, col)).unwrap_or_default();
        change(&mut cell);
        if !cell.is_blank() {
            self.cells.insert((row, col), cell);
        }
    }

    pub fn remove(&mut self, row: u32, col: u16) -> Option<Cell> {
        self.cells.remove(&(row, col))
    }

    /// Move rows `at..` down by `count`; rows pushed off the sheet are lost
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let moved = self.cells.split_off(&(at, 0));
        self.cells.extend(moved.into_iter().filter_map(|((row, col), cell)| {
            let target = row.checked_add(count).filter(|&r| r < MAX_ROWS)?;
            Some(((target, col), cell))
        }));
    }

    /// Drop rows `at..at + count` and move the rows below up
    pub fn delete_rows(&mut self, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let end = at.saturating_add(count);
        let moved = self.cells.split_off(&(at, 0));
        self.cells.extend(
            moved
                .into_iter()
                .filter(|((row, _), _)| *row >= end)
                .map(|((row, col), cell)| ((row - count, col), cell)),
        );
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest rectangle holding every stored cell, as row and column spans
    pub fn bounds(&self) -> Option<(RangeInclusive<u32>, RangeInclusive<u16>)> {
        let (&(first_row, _), _) = self.cells.first_key_value()?;
        let (&(last_row, _), _) = self.cells.last_key_value()?;
        let (min_col, max_col) = self
            .cells
            .keys()
            .fold((u16::MAX, 0), |(lo, hi), &(_, col)| (lo.min(col), hi.max(col)));
        Some((first_row..=last_row, min_col..=max_col))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.cells.iter().map(|(&(row, col), cell)| (row, col, cell))
    }

    pub fn row(&self, row: u32) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells
            .range((row, 0)..=(row, u16::MAX))
            .map(|(&(_, col), cell)| (col, cell))
    }
}
