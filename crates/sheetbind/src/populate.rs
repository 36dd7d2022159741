//! Template-row writer
//!
//! A template row describes one output row. Each non-empty cell is one of:
//!
//! - `{Name}`: replaced by the item's value of that property or column
//! - `{_}`: left blank
//! - anything else: copied as a literal
//!
//! The template row is removed, then one row per item is inserted where it
//! stood, carrying the template cells' styles. Content below the template
//! moves down.
//!
//! # Example
//!
//! ```rust
//! use sheetbind::prelude::*;
//!
//! #[derive(Default)]
//! struct Line {
//!     name: String,
//!     age: i32,
//! }
//!
//! sheetbind::record!(Line { name: String, age: i32 });
//!
//! let mut sheet = Worksheet::new("Report");
//! sheet.set_value("A2", "{Name}").unwrap();
//! sheet.set_value("B2", "Age").unwrap();
//! sheet.set_value("C2", "{_}").unwrap();
//!
//! let lines = vec![Line { name: "A".into(), age: 5 }];
//! let last = sheet.populate(1, &lines, &mut NoHooks).unwrap();
//!
//! assert_eq!(last, Some(1));
//! assert_eq!(sheet.get_value("A2").unwrap(), CellValue::string("A"));
//! assert_eq!(sheet.get_value("B2").unwrap(), CellValue::string("Age"));
//! assert!(sheet.get_value("C2").unwrap().is_empty());
//! ```

use lazy_regex::regex_captures;
use sheetbind_core::{CellValue, Style, Worksheet};

use crate::error::Result;
use crate::record::{eq_ignore_case, find_field, Record};
use crate::table::{DataRow, RowSet};
use crate::value::FieldValue;

/// Text written where a token names nothing the source can provide
pub const UNMAPPED_MARKER: &str = "(can not map)";

/// Callbacks around each emitted row.
///
/// Every method has a default that keeps rows contiguous. `I` is the item
/// type: the record type for [`populate`], a [`DataRow`] for [`populate_rows`].
pub trait PopulateHooks<I: ?Sized> {
    /// Row the item is written to; `row` is the next free row.
    ///
    /// The item's row is inserted at the returned index. A hook that writes
    /// rows of its own (a group heading, say) inserts them itself.
    fn before_row(&mut self, sheet: &mut Worksheet, row: u32, index: usize, item: &I) -> Result<u32> {
        let _ = (sheet, index, item);
        Ok(row)
    }

    /// Last row occupied by the item; the next item starts below it
    fn after_row(&mut self, sheet: &mut Worksheet, row: u32, index: usize, item: &I) -> Result<u32> {
        let _ = (sheet, index, item);
        Ok(row)
    }

    /// Final adjustment once every item is written; the result is returned
    /// to the caller
    fn after_all(&mut self, sheet: &mut Worksheet, last_row: Option<u32>) -> Result<Option<u32>> {
        let _ = sheet;
        Ok(last_row)
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<I: ?Sized> PopulateHooks<I> for NoHooks {}

/// What a template column produces for each item
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<K> {
    /// Value of a property or column
    Source(K),
    /// Fixed content from the template
    Literal(CellValue),
    /// `{_}`
    Blank,
    /// Token naming nothing the source can provide
    Unmapped(String),
}

/// One template column: where it goes, what it holds, how it looks
#[derive(Debug, Clone)]
pub struct TemplateColumn<K> {
    pub column: u16,
    pub slot: Slot<K>,
    pub style: Style,
}

enum Token<'t> {
    Blank,
    Name(&'t str),
}

fn parse_token(text: &str) -> Option<Token<'_>> {
    let (_, name) = regex_captures!(r"^\{\s*([^{}]*?)\s*\}$", text.trim())?;
    match name {
        "_" => Some(Token::Blank),
        "" => None,
        name => Some(Token::Name(name)),
    }
}

/// Read the template row, resolving `{Name}` tokens with `resolve`
pub fn read_template<K, F>(sheet: &Worksheet, template_row: u32, resolve: F) -> Vec<TemplateColumn<K>>
where
    F: Fn(&str) -> Option<K>,
{
    let mut columns = Vec::new();
    for (column, cell) in sheet.row_cells(template_row) {
        if cell.value.is_empty() {
            continue;
        }
        let slot = match cell.value.as_string().and_then(parse_token) {
            Some(Token::Blank) => Slot::Blank,
            Some(Token::Name(name)) => match resolve(name) {
                Some(key) => Slot::Source(key),
                None => {
                    log::warn!(
                        "template row {}: nothing to map for {{{}}}",
                        template_row + 1,
                        name
                    );
                    Slot::Unmapped(name.to_string())
                }
            },
            None => Slot::Literal(cell.value.clone()),
        };
        columns.push(TemplateColumn {
            column,
            slot,
            style: sheet.cell_style_at(template_row, column),
        });
    }
    columns
}

/// Write one row per record at the template row.
///
/// Returns the last row written, or `None` for an empty sequence.
pub fn populate<'r, T, I, H>(
    sheet: &mut Worksheet,
    template_row: u32,
    records: I,
    hooks: &mut H,
) -> Result<Option<u32>>
where
    T: Record + 'r,
    I: IntoIterator<Item = &'r T>,
    H: PopulateHooks<T> + ?Sized,
{
    let fields = T::fields();
    let columns = read_template(sheet, template_row, |name| {
        find_field(&fields, name).map(|f| f.name)
    });
    log::debug!(
        "{}: template row {} has {} columns",
        T::type_name(),
        template_row + 1,
        columns.len()
    );

    emit_rows(sheet, template_row, &columns, records, hooks, |record: &T, name| {
        record.get_field(name).unwrap_or_default()
    })
}

/// Write one row per row-set row at the template row.
///
/// Tokens match column names exactly first, then ignoring case.
pub fn populate_rows<'s, R, H>(
    sheet: &mut Worksheet,
    template_row: u32,
    rows: &'s R,
    hooks: &mut H,
) -> Result<Option<u32>>
where
    R: RowSet + ?Sized,
    H: PopulateHooks<DataRow<'s, R>> + ?Sized,
{
    let names = rows.column_names();
    let columns = read_template(sheet, template_row, |name| {
        names
            .iter()
            .position(|c| *c == name)
            .or_else(|| names.iter().position(|c| eq_ignore_case(c, name)))
    });
    log::debug!(
        "row set: template row {} has {} columns",
        template_row + 1,
        columns.len()
    );

    let items: Vec<DataRow<'s, R>> = (0..rows.row_count())
        .map(|index| DataRow::new(rows, index))
        .collect();
    emit_rows(sheet, template_row, &columns, &items, hooks, |row: &DataRow<'s, R>, column| {
        row.value(*column)
    })
}

fn emit_rows<'i, K, I, Item, H, F>(
    sheet: &mut Worksheet,
    template_row: u32,
    columns: &[TemplateColumn<K>],
    items: I,
    hooks: &mut H,
    fetch: F,
) -> Result<Option<u32>>
where
    Item: 'i + ?Sized,
    I: IntoIterator<Item = &'i Item>,
    H: PopulateHooks<Item> + ?Sized,
    F: Fn(&Item, &K) -> FieldValue,
{
    sheet.delete_rows(template_row, 1)?;

    let mut next = template_row;
    let mut last = None;
    for (index, item) in items.into_iter().enumerate() {
        let row = hooks.before_row(sheet, next, index, item)?;
        sheet.insert_rows(row, 1)?;

        for column in columns {
            let value = match &column.slot {
                Slot::Source(key) => CellValue::from(fetch(item, key)),
                Slot::Literal(value) => value.clone(),
                Slot::Blank => CellValue::Empty,
                Slot::Unmapped(_) => CellValue::string(UNMAPPED_MARKER),
            };
            sheet.set_cell_value_at(row, column.column, value)?;
            if !column.style.is_default() {
                sheet.set_cell_style_at(row, column.column, &column.style)?;
            }
        }
        log::trace!("row {} written for item {}", row + 1, index);

        let end = hooks.after_row(sheet, row, index, item)?;
        last = Some(end);
        next = end.saturating_add(1);
    }

    hooks.after_all(sheet, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldDef;
    use crate::value::FieldKind;
    use pretty_assertions::assert_eq;
    use sheetbind_core::Color;

    #[derive(Debug, Default)]
    struct Item {
        title: String,
        price: f64,
    }

    crate::record!(Item {
        title: String,
        price: f64,
    });

    fn items() -> Vec<Item> {
        vec![
            Item {
                title: "Pen".into(),
                price: 1.5,
            },
            Item {
                title: "Ink".into(),
                price: 4.0,
            },
        ]
    }

    #[test]
    fn test_parse_token() {
        assert!(matches!(parse_token("{_}"), Some(Token::Blank)));
        assert!(matches!(parse_token(" { Title } "), Some(Token::Name("Title"))));
        assert!(parse_token("{}").is_none());
        assert!(parse_token("Title").is_none());
        assert!(parse_token("{a}{b}").is_none());
    }

    #[test]
    fn test_read_template_classifies_cells() {
        let mut ws = Worksheet::new("T");
        ws.set_cell_value_at(3, 0, "{title}").unwrap();
        ws.set_cell_value_at(3, 1, "{_}").unwrap();
        ws.set_cell_value_at(3, 2, "Total").unwrap();
        ws.set_cell_value_at(3, 3, 7.0).unwrap();
        ws.set_cell_value_at(3, 5, "{Colour}").unwrap();

        let fields = vec![FieldDef::new("title", FieldKind::Text)];
        let columns = read_template(&ws, 3, |name| find_field(&fields, name).map(|f| f.name));
        let slots: Vec<_> = columns.iter().map(|c| (c.column, c.slot.clone())).collect();

        assert_eq!(
            slots,
            vec![
                (0, Slot::Source("title")),
                (1, Slot::Blank),
                (2, Slot::Literal(CellValue::string("Total"))),
                (3, Slot::Literal(CellValue::Number(7.0))),
                (5, Slot::Unmapped("Colour".to_string())),
            ]
        );
    }

    #[test]
    fn test_populate_inserts_rows_and_copies_styles() {
        let mut ws = Worksheet::new("T");
        ws.set_cell_value("A1", "Title").unwrap();
        ws.set_cell_value("A2", "{Title}").unwrap();
        ws.set_cell_value("B2", "{price}").unwrap();
        ws.set_cell_style("B2", &Style::new().with_background(Color::YELLOW))
            .unwrap();
        ws.set_cell_value("A3", "footer").unwrap();

        let last = populate(&mut ws, 1, &items(), &mut NoHooks).unwrap();

        assert_eq!(last, Some(2));
        assert_eq!(ws.get_value("A2").unwrap(), CellValue::string("Pen"));
        assert_eq!(ws.get_value("B3").unwrap(), CellValue::Number(4.0));
        assert_eq!(ws.cell_style("B3").unwrap().background, Some(Color::YELLOW));
        assert_eq!(ws.get_value("A4").unwrap(), CellValue::string("footer"));
    }

    #[test]
    fn test_populate_empty_sequence_removes_template() {
        let mut ws = Worksheet::new("T");
        ws.set_cell_value("A1", "{title}").unwrap();
        ws.set_cell_value("A2", "after").unwrap();

        let last = populate::<Item, _, _>(&mut ws, 0, &[], &mut NoHooks).unwrap();

        assert_eq!(last, None);
        assert_eq!(ws.get_value("A1").unwrap(), CellValue::string("after"));
    }
}
