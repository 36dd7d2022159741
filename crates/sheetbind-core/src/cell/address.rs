//! A1-style addresses and rectangular ranges

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Position of one cell, 0-based: `A1` is row 0, column 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `B3`, `b3` or `$B$3`
    ///
    /// ```
    /// use sheetbind_core::CellAddress;
    ///
    /// assert_eq!(CellAddress::parse("$C$1").unwrap(), CellAddress::new(0, 2));
    /// assert!(CellAddress::parse("A0").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || Error::InvalidAddress(text.to_string());

        let unanchored = text.strip_prefix('$').unwrap_or(text);
        let digits_at = unanchored
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (letters, rest) = unanchored.split_at(digits_at);
        let digits = rest.strip_prefix('$').unwrap_or(rest);
        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = Self::column_index(letters)?;
        let row = match digits.parse::<u32>() {
            Ok(0) | Err(_) => return Err(invalid()),
            Ok(n) if n > MAX_ROWS => return Err(Error::RowOutOfBounds(n - 1, MAX_ROWS - 1)),
            Ok(n) => n - 1,
        };
        Ok(Self { row, col })
    }

    /// `0` is `A`, `26` is `AA`
    pub fn column_name(col: u16) -> String {
        let mut letters = Vec::new();
        let mut n = u32::from(col) + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.iter().rev().map(|&b| char::from(b)).collect()
    }

    /// Inverse of [`CellAddress::column_name`], case-insensitive
    pub fn column_index(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress(letters.to_string()));
        }
        let mut n: u32 = 0;
        for b in letters.bytes() {
            if !b.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(letters.to_string()));
            }
            n = n * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
            if n > u32::from(MAX_COLS) {
                return Err(Error::InvalidAddress(format!("column {} is past XFD", letters)));
            }
        }
        Ok((n - 1) as u16)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Inclusive rectangle of cells; `start` is always the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Any two opposite corners
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `A1:C3`; a lone address is a one-cell range
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let Some((a, b)) = text.split_once(':') else {
            let addr = CellAddress::parse(text)?;
            return Ok(Self::new(addr, addr));
        };
        let corner = |s: &str| {
            CellAddress::parse(s).map_err(|e| Error::InvalidRange(format!("{}: {}", text, e)))
        };
        Ok(Self::new(corner(a)?, corner(b)?))
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Addresses row by row, left to right
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> {
        let (cols, rows) = (self.start.col..=self.end.col, self.start.row..=self.end.row);
        rows.flat_map(move |row| cols.clone().map(move |col| CellAddress::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        for (index, name) in [(0, "A"), (25, "Z"), (26, "AA"), (701, "ZZ"), (702, "AAA"), (16383, "XFD")] {
            assert_eq!(CellAddress::column_name(index), name);
            assert_eq!(CellAddress::column_index(name).unwrap(), index);
        }
        assert_eq!(CellAddress::column_index("ab").unwrap(), 27);
        assert!(CellAddress::column_index("XFE").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse(" $B$2 ").unwrap(), CellAddress::new(1, 1));
        assert_eq!("c10".parse::<CellAddress>().unwrap(), CellAddress::new(9, 2));
        assert_eq!(
            CellAddress::parse("XFD1048576").unwrap().to_string(),
            "XFD1048576"
        );

        for bad in ["", "A", "1", "A0", "A1048577", "A1B", "$$A1", "A-1"] {
            assert!(CellAddress::parse(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_range_is_normalized() {
        let range = CellRange::parse("B2:A1").unwrap();
        assert_eq!(range.to_string(), "A1:B2");
        assert_eq!(
            range.cells().map(|a| a.to_string()).collect::<Vec<_>>(),
            vec!["A1", "B1", "A2", "B2"]
        );
        assert_eq!(CellRange::parse("C3").unwrap().cells().count(), 1);
        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();
        assert!(range.contains(&CellAddress::new(2, 2)));
        assert!(!range.contains(&CellAddress::new(0, 0)));
        assert!(!range.contains(&CellAddress::new(4, 1)));
    }
}
