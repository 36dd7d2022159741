//! Header-based reader: worksheet rows to typed records
//!
//! Row 0 holds the headers. Each mapped property of the record type is
//! matched to a header column, then every following row becomes one record.
//!
//! # Example
//!
//! ```rust
//! use sheetbind::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! sheetbind::record!(Person {
//!     name: String => "Full Name",
//!     age: i32,
//! });
//!
//! let mut sheet = Worksheet::new("People");
//! sheet.set_value("A1", "Full Name").unwrap();
//! sheet.set_value("B1", "AGE").unwrap();
//! sheet.set_value("A2", "Ada").unwrap();
//! sheet.set_value("B2", 36).unwrap();
//!
//! let people: Vec<Person> = sheet.convert_to(&ConvertOptions::default()).unwrap();
//! assert_eq!(people[0].name, "Ada");
//! assert_eq!(people[0].age, 36);
//! ```

use std::fmt;

use sheetbind_core::{CellAddress, CellKind, CellValue, Worksheet, MAX_ROWS};

use crate::coerce::{coerce_cell, CoerceError, DEFAULT_DATE_FORMATS};
use crate::error::{Error, Result};
use crate::record::{FieldDef, Record};
use crate::value::FieldValue;

/// Default number of header columns scanned
pub const DEFAULT_MAX_COLUMNS: u16 = 256;

/// Default number of consecutive content-free rows that end the scan
pub const DEFAULT_BLANK_ROWS_TO_STOP: u32 = 3;

/// What the external-reference callbacks get to see
#[derive(Debug)]
pub struct ExternalReference<'r> {
    /// Cell holding the formula
    pub cell: CellAddress,
    /// Header text of the column
    pub column: &'r str,
    /// Property being read
    pub property: &'static str,
    /// Error raised by the worksheet model
    pub error: &'r sheetbind_core::Error,
    /// Last calculated result of the formula
    pub cached_value: &'r CellValue,
}

type NameMapping<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;
type SkipPredicate<'a> = Box<dyn Fn(&FieldDef) -> bool + 'a>;
type ExternalPredicate<'a> = Box<dyn Fn(&ExternalReference<'_>) -> bool + 'a>;
type ExternalObserver<'a> = Box<dyn Fn(&ExternalReference<'_>) + 'a>;

/// Options for [`convert_to`]
pub struct ConvertOptions<'a> {
    /// Fail with [`Error::MissingMappings`] when a considered property has no column
    pub require_all_mappings: bool,
    /// Formats tried when a date-time property reads a text cell
    pub date_formats: Vec<String>,
    /// Number of header columns scanned (default: 256)
    pub max_columns: u16,
    /// Rows at or past this index are not read
    pub max_rows: u32,
    /// Consecutive content-free rows that end the scan (default: 3)
    pub blank_rows_to_stop: u32,
    name_mapping: Option<NameMapping<'a>>,
    skip: Option<SkipPredicate<'a>>,
    use_cached_value: Option<ExternalPredicate<'a>>,
    on_external_reference: Option<ExternalObserver<'a>>,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        Self {
            require_all_mappings: false,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            max_columns: DEFAULT_MAX_COLUMNS,
            max_rows: MAX_ROWS,
            blank_rows_to_stop: DEFAULT_BLANK_ROWS_TO_STOP,
            name_mapping: None,
            skip: None,
            use_cached_value: None,
            on_external_reference: None,
        }
    }
}

impl<'a> ConvertOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header name to look for, given a property name; `None` falls through
    /// to the display name and then the property name
    pub fn name_mapping<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'a,
    {
        self.name_mapping = Some(Box::new(f));
        self
    }

    /// Leave out properties for which the predicate returns `true`
    pub fn skip<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldDef) -> bool + 'a,
    {
        self.skip = Some(Box::new(f));
        self
    }

    pub fn require_all_mappings(mut self, require: bool) -> Self {
        self.require_all_mappings = require;
        self
    }

    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_columns(mut self, max_columns: u16) -> Self {
        self.max_columns = max_columns;
        self
    }

    pub fn max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn blank_rows_to_stop(mut self, rows: u32) -> Self {
        self.blank_rows_to_stop = rows;
        self
    }

    /// Read the cached result of an external-reference formula when the
    /// predicate accepts it, instead of failing
    pub fn use_cached_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExternalReference<'_>) -> bool + 'a,
    {
        self.use_cached_value = Some(Box::new(f));
        self
    }

    /// Observe every external-reference formula met during the scan
    pub fn on_external_reference<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExternalReference<'_>) + 'a,
    {
        self.on_external_reference = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for ConvertOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("require_all_mappings", &self.require_all_mappings)
            .field("date_formats", &self.date_formats)
            .field("max_columns", &self.max_columns)
            .field("max_rows", &self.max_rows)
            .field("blank_rows_to_stop", &self.blank_rows_to_stop)
            .field("name_mapping", &self.name_mapping.is_some())
            .field("skip", &self.skip.is_some())
            .field("use_cached_value", &self.use_cached_value.is_some())
            .field("on_external_reference", &self.on_external_reference.is_some())
            .finish()
    }
}

/// A property resolved to a header column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub field: FieldDef,
    /// Header text as found in the sheet (trimmed)
    pub header: String,
    pub column: u16,
}

/// Resolve the properties of `T` against the header row.
///
/// Candidates per property, first match wins: the name-mapping result, the
/// display name, the property name. Matching is case-insensitive on trimmed
/// header text.
pub fn resolve_columns<T: Record>(
    sheet: &Worksheet,
    options: &ConvertOptions<'_>,
) -> Result<Vec<ColumnMapping>> {
    let headers: Vec<(u16, String)> = sheet
        .row_cells(0)
        .filter(|(col, _)| *col < options.max_columns)
        .map(|(col, cell)| (col, cell.value.effective_value().to_string().trim().to_string()))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    let lowered: Vec<String> = headers.iter().map(|(_, h)| h.to_lowercase()).collect();

    let mut mappings = Vec::new();
    let mut missing = Vec::new();

    for field in T::fields() {
        if !field.mapped || options.skip.as_ref().map_or(false, |skip| skip(&field)) {
            continue;
        }

        let mapped_name = options.name_mapping.as_ref().and_then(|map| map(field.name));
        let mut candidates: Vec<&str> = mapped_name.as_deref().into_iter().collect();
        for name in field.header_names() {
            candidates.push(name);
        }
        let found = candidates.iter().find_map(|candidate| {
            let candidate = candidate.trim().to_lowercase();
            lowered.iter().position(|h| *h == candidate)
        });

        match found {
            Some(index) => {
                let (column, header) = &headers[index];
                log::debug!(
                    "{}: property '{}' -> column {} ('{}')",
                    T::type_name(),
                    field.name,
                    CellAddress::column_name(*column),
                    header
                );
                mappings.push(ColumnMapping {
                    header: header.clone(),
                    column: *column,
                    field,
                });
            }
            None => {
                log::debug!("{}: property '{}' has no column", T::type_name(), field.name);
                missing.push(field.name.to_string());
            }
        }
    }

    if options.require_all_mappings && !missing.is_empty() {
        return Err(Error::MissingMappings {
            type_name: T::type_name(),
            missing,
        });
    }
    Ok(mappings)
}

/// Read every data row below the header row into a record of type `T`.
///
/// Rows whose mapped cells are all blank are skipped; the scan ends after
/// [`ConvertOptions::blank_rows_to_stop`] of them in a row.
pub fn convert_to<T: Record>(sheet: &Worksheet, options: &ConvertOptions<'_>) -> Result<Vec<T>> {
    let mappings = resolve_columns::<T>(sheet, options)?;
    let mut records = Vec::new();
    let mut empty_run = 0u32;
    let end = options.max_rows.min(MAX_ROWS);

    for row in 1..end {
        let mut record = T::default();
        let mut has_content = false;

        for mapping in &mappings {
            let cell = CellAddress::new(row, mapping.column);
            let value = read_cell(sheet, cell, mapping, options)?;
            match value.kind() {
                CellKind::Blank => continue,
                CellKind::Error => {
                    return Err(Error::CellError {
                        cell,
                        column: mapping.header.clone(),
                        property: mapping.field.name.to_string(),
                        error: value.as_error().unwrap_or(sheetbind_core::CellError::Value),
                    });
                }
                _ => has_content = true,
            }

            let coerced = coerce_cell(&value, mapping.field.kind, &options.date_formats)
                .map_err(|e| coerce_error(e, cell, mapping, &value))?;
            if let Some(field_value) = coerced {
                assign(&mut record, field_value, cell, mapping, &value)?;
            }
        }

        if has_content {
            log::trace!("{}: row {} read", T::type_name(), row + 1);
            records.push(record);
            empty_run = 0;
        } else {
            empty_run += 1;
            if empty_run >= options.blank_rows_to_stop {
                log::debug!(
                    "{}: stopped after {} empty rows at row {}",
                    T::type_name(),
                    empty_run,
                    row + 1
                );
                break;
            }
        }
    }

    log::debug!("{}: read {} records", T::type_name(), records.len());
    Ok(records)
}

/// Get a cell's readable value, routing external references through the callbacks
fn read_cell(
    sheet: &Worksheet,
    cell: CellAddress,
    mapping: &ColumnMapping,
    options: &ConvertOptions<'_>,
) -> Result<CellValue> {
    match sheet.value_at(cell.row, cell.col) {
        Ok(value) => Ok(value),
        Err(error) if error.is_external_reference() => {
            let cached_value = sheet.cached_value_at(cell.row, cell.col);
            let context = ExternalReference {
                cell,
                column: &mapping.header,
                property: mapping.field.name,
                error: &error,
                cached_value: &cached_value,
            };
            if let Some(observe) = &options.on_external_reference {
                observe(&context);
            }
            if options
                .use_cached_value
                .as_ref()
                .map_or(false, |accept| accept(&context))
            {
                log::debug!("{}: using cached value of external reference", cell);
                return Ok(cached_value);
            }
            Err(Error::ExternalReference {
                cell,
                column: mapping.header.clone(),
                property: mapping.field.name.to_string(),
                source: error,
            })
        }
        Err(error) => Err(error.into()),
    }
}

fn assign<T: Record>(
    record: &mut T,
    field_value: FieldValue,
    cell: CellAddress,
    mapping: &ColumnMapping,
    value: &CellValue,
) -> Result<()> {
    if record.set_field(mapping.field.name, field_value) {
        return Ok(());
    }
    Err(Error::Conversion {
        cell,
        column: mapping.header.clone(),
        property: mapping.field.name.to_string(),
        target: mapping.field.kind,
        value: value.to_string(),
        reason: "value does not fit the property type".to_string(),
    })
}

fn coerce_error(
    error: CoerceError,
    cell: CellAddress,
    mapping: &ColumnMapping,
    value: &CellValue,
) -> Error {
    match error {
        CoerceError::Parse(text) => Error::Parse {
            cell,
            column: mapping.header.clone(),
            property: mapping.field.name.to_string(),
            target: mapping.field.kind,
            text,
        },
        CoerceError::Conversion(reason) => Error::Conversion {
            cell,
            column: mapping.header.clone(),
            property: mapping.field.name.to_string(),
            target: mapping.field.kind,
            value: value.to_string(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldKind;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct Part {
        code: String,
        qty: i32,
        weight: Option<f64>,
        note: String,
    }

    crate::record!(Part {
        code: String => "Part Code",
        qty: i32,
        weight: Option<f64>,
        #[not_mapped]
        note: String,
    });

    fn sheet(rows: &[&[CellValue]]) -> Worksheet {
        let mut ws = Worksheet::new("Parts");
        for (r, cells) in rows.iter().enumerate() {
            for (c, value) in cells.iter().enumerate() {
                ws.set_cell_value_at(r as u32, c as u16, value.clone()).unwrap();
            }
        }
        ws
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_resolve_columns_priority() {
        let ws = sheet(&[&[text(" part code "), text("QTY"), text("Mass"), text("note")]]);

        let mappings = resolve_columns::<Part>(&ws, &ConvertOptions::default()).unwrap();
        assert_eq!(
            mappings
                .iter()
                .map(|m| (m.field.name, m.column))
                .collect::<Vec<_>>(),
            vec![("code", 0), ("qty", 1)]
        );

        let options = ConvertOptions::new()
            .name_mapping(|name| (name == "weight").then(|| "mass".to_string()));
        let mappings = resolve_columns::<Part>(&ws, &options).unwrap();
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[2].header, "Mass");
        assert_eq!(mappings[2].field.kind, FieldKind::Double);
    }

    #[test]
    fn test_missing_mappings_lists_every_property() {
        let ws = sheet(&[&[text("Unrelated")]]);
        let options = ConvertOptions::new().require_all_mappings(true);

        match convert_to::<Part>(&ws, &options) {
            Err(Error::MissingMappings { type_name, missing }) => {
                assert_eq!(type_name, "Part");
                assert_eq!(missing, vec!["code", "qty", "weight"]);
            }
            other => panic!("expected MissingMappings, got {:?}", other),
        }

        let options = ConvertOptions::new()
            .require_all_mappings(true)
            .skip(|field| field.name != "code");
        assert!(matches!(
            convert_to::<Part>(&ws, &options),
            Err(Error::MissingMappings { missing, .. }) if missing == vec!["code"]
        ));
    }

    #[test]
    fn test_max_columns_bounds_header_scan() {
        let ws = sheet(&[&[text("x"), text("qty")], &[CellValue::Empty, CellValue::Number(4.0)]]);
        let parts = convert_to::<Part>(&ws, &ConvertOptions::new().max_columns(1)).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_rows_become_records() {
        let ws = sheet(&[
            &[text("Part Code"), text("qty"), text("weight")],
            &[text("P-1"), CellValue::Number(3.0), CellValue::Number(1.25)],
            &[text("P-2"), text("7"), CellValue::Empty],
        ]);

        let parts = convert_to::<Part>(&ws, &ConvertOptions::default()).unwrap();
        assert_eq!(
            parts,
            vec![
                Part {
                    code: "P-1".into(),
                    qty: 3,
                    weight: Some(1.25),
                    note: String::new(),
                },
                Part {
                    code: "P-2".into(),
                    qty: 7,
                    weight: None,
                    note: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_value_too_large_for_property() {
        let ws = sheet(&[&[text("qty")], &[CellValue::Number(5e9)]]);
        let err = convert_to::<Part>(&ws, &ConvertOptions::default()).unwrap_err();
        match err {
            Error::Conversion {
                cell,
                property,
                target,
                ..
            } => {
                assert_eq!(cell.to_string(), "A2");
                assert_eq!(property, "qty");
                assert_eq!(target, FieldKind::Int);
            }
            other => panic!("expected Conversion, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_carries_context() {
        let ws = sheet(&[&[text("qty")], &[text("seven")]]);
        let err = convert_to::<Part>(&ws, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Parse { ref text, .. } if text == "seven"));
        assert_eq!(err.cell().map(|c| c.to_string()), Some("A2".to_string()));
    }
}
