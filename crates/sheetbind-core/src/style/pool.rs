//! Interned styles
//!
//! Cells store a `u32` index instead of a full [`Style`]. Slot 0 is the
//! default style, so a cell with index 0 carries no formatting.

use ahash::AHashMap;

use super::Style;

#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    lookup: AHashMap<Style, u32>,
}

impl StylePool {
    pub fn new() -> Self {
        let default = Style::default();
        let mut lookup = AHashMap::new();
        lookup.insert(default.clone(), 0);
        Self {
            styles: vec![default],
            lookup,
        }
    }

    /// Index of an equal style, adding it when unseen
    pub fn intern(&mut self, style: Style) -> u32 {
        if let Some(&index) = self.lookup.get(&style) {
            return index;
        }
        let index = self.styles.len() as u32;
        self.lookup.insert(style.clone(), index);
        self.styles.push(style);
        index
    }

    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of distinct styles, the default one included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() == 1
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn test_equal_styles_share_an_index() {
        let mut pool = StylePool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.intern(Style::default()), 0);

        let gray = pool.intern(Style::new().with_background(Color::LIGHT_GRAY));
        let again = pool.intern(Style::new().with_background(Color::LIGHT_GRAY));
        let money = pool.intern(Style::new().with_number_format("#,##0.00"));

        assert_eq!(gray, again);
        assert_ne!(gray, money);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(money).map(|s| s.number_format.format_string()), Some("#,##0.00"));
    }
}
