//! Cell-to-property coercion
//!
//! Converts the effective value of a cell into a [`FieldValue`] of the
//! property's declared [`FieldKind`]:
//!
//! | Property | Cell | Result |
//! |---|---|---|
//! | text | any non-blank | display text of the cell |
//! | date-time | date-time / number / text | direct / serial date / parsed (skipped if unparsable) |
//! | date-time with offset | date-time / number / text | at UTC / serial date at UTC / RFC 3339 or parsed at UTC (skipped if unparsable) |
//! | boolean | boolean / number / text | direct / non-zero / `true` or `false` |
//! | time span | time span / number / text | direct / fraction of a day / `[-][d.]hh:mm[:ss[.fff]]` |
//! | numeric | text | strict parse |
//! | numeric | anything else | numeric view of the cell, integers rounded half to even |

use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use sheetbind_core::cell::{datetime_from_serial, duration_from_days};
use sheetbind_core::CellValue;
use thiserror::Error;

use crate::value::{utc, FieldKind, FieldValue};

/// Date formats tried, in order, when a date-time property reads a text cell
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Why a cell could not be coerced
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// Text that does not parse as the target type
    #[error("'{0}' does not parse")]
    Parse(String),

    /// Value of the wrong shape or out of range
    #[error("{0}")]
    Conversion(String),
}

/// Coerce a cell's effective value to a property kind.
///
/// `Ok(None)` means "leave the property untouched": blank cells, error cells
/// (the caller reports those) and date text that matches no format.
pub fn coerce_cell(
    value: &CellValue,
    kind: FieldKind,
    date_formats: &[String],
) -> Result<Option<FieldValue>, CoerceError> {
    let value = value.effective_value();
    if matches!(value, CellValue::Empty | CellValue::Error(_)) {
        return Ok(None);
    }

    match kind {
        FieldKind::Text => Ok(Some(FieldValue::Text(value.to_string()))),
        FieldKind::DateTime => to_datetime(value, date_formats),
        FieldKind::DateTimeOffset => to_datetime_offset(value, date_formats),
        FieldKind::Bool => to_bool(value).map(Some),
        FieldKind::TimeSpan => to_time_span(value).map(Some),
        FieldKind::Int | FieldKind::Decimal | FieldKind::Float | FieldKind::Double => {
            to_number(value, kind).map(Some)
        }
    }
}

fn to_datetime(
    value: &CellValue,
    date_formats: &[String],
) -> Result<Option<FieldValue>, CoerceError> {
    match value {
        CellValue::DateTime(dt) => Ok(Some(FieldValue::DateTime(*dt))),
        CellValue::String(s) => Ok(parse_datetime(s, date_formats).map(FieldValue::DateTime)),
        CellValue::Number(n) => datetime_from_serial(*n)
            .map(|dt| Some(FieldValue::DateTime(dt)))
            .ok_or_else(|| CoerceError::Conversion(format!("{} is not a valid date serial", n))),
        other => Err(CoerceError::Conversion(format!(
            "{} cell cannot hold a date",
            other.type_name()
        ))),
    }
}

fn to_datetime_offset(
    value: &CellValue,
    date_formats: &[String],
) -> Result<Option<FieldValue>, CoerceError> {
    let at_utc = |dt: NaiveDateTime| FieldValue::DateTimeOffset(utc().from_utc_datetime(&dt));
    match value {
        CellValue::DateTime(dt) => Ok(Some(at_utc(*dt))),
        CellValue::String(s) => {
            let text = s.trim();
            Ok(DateTime::<FixedOffset>::parse_from_rfc3339(text)
                .ok()
                .map(FieldValue::DateTimeOffset)
                .or_else(|| parse_datetime(text, date_formats).map(at_utc)))
        }
        CellValue::Number(n) => datetime_from_serial(*n)
            .map(|dt| Some(at_utc(dt)))
            .ok_or_else(|| CoerceError::Conversion(format!("{} is not a valid date serial", n))),
        other => Err(CoerceError::Conversion(format!(
            "{} cell cannot hold a date",
            other.type_name()
        ))),
    }
}

fn to_bool(value: &CellValue) -> Result<FieldValue, CoerceError> {
    match value {
        CellValue::Boolean(b) => Ok(FieldValue::Bool(*b)),
        CellValue::Number(n) => Ok(FieldValue::Bool(*n != 0.0)),
        CellValue::String(s) => parse_bool(s)
            .map(FieldValue::Bool)
            .ok_or_else(|| CoerceError::Parse(s.clone())),
        other => Err(CoerceError::Conversion(format!(
            "{} cell cannot hold a boolean",
            other.type_name()
        ))),
    }
}

fn to_time_span(value: &CellValue) -> Result<FieldValue, CoerceError> {
    match value {
        CellValue::TimeSpan(d) => Ok(FieldValue::TimeSpan(*d)),
        CellValue::String(s) => parse_duration(s)
            .map(FieldValue::TimeSpan)
            .ok_or_else(|| CoerceError::Parse(s.clone())),
        other => other
            .as_number()
            .and_then(duration_from_days)
            .map(FieldValue::TimeSpan)
            .ok_or_else(|| {
                CoerceError::Conversion(format!("{} cell cannot hold a time span", other.type_name()))
            }),
    }
}

fn to_number(value: &CellValue, kind: FieldKind) -> Result<FieldValue, CoerceError> {
    if let CellValue::String(s) = value {
        return parse_number(s, kind).ok_or_else(|| CoerceError::Parse(s.clone()));
    }
    let n = value.as_number().ok_or_else(|| {
        CoerceError::Conversion(format!("{} cell is not numeric", value.type_name()))
    })?;
    number_to_field(n, kind)
}

/// Strict text parse for the numeric kinds
fn parse_number(text: &str, kind: FieldKind) -> Option<FieldValue> {
    let text = text.trim();
    match kind {
        // digits past i64::MAX stay text for the unsigned property types
        FieldKind::Int => match text.parse::<i64>() {
            Ok(i) => Some(FieldValue::Int(i)),
            Err(_) => text.parse::<u64>().ok().map(|_| FieldValue::Text(text.to_string())),
        },
        FieldKind::Decimal => Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .ok()
            .map(FieldValue::Decimal),
        FieldKind::Float => text.parse::<f32>().ok().map(FieldValue::Float),
        FieldKind::Double => text.parse::<f64>().ok().map(FieldValue::Double),
        _ => None,
    }
}

fn number_to_field(n: f64, kind: FieldKind) -> Result<FieldValue, CoerceError> {
    if !n.is_finite() {
        return Err(CoerceError::Conversion(format!("{} is not a finite number", n)));
    }
    match kind {
        FieldKind::Int => {
            let rounded = round_half_even(n);
            // i64::MAX is not representable as f64; 2^63 is the first value past it
            if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(CoerceError::Conversion(format!(
                    "{} is outside the integer range",
                    n
                )));
            }
            Ok(FieldValue::Int(rounded as i64))
        }
        FieldKind::Decimal => Decimal::from_str(&n.to_string())
            .map(FieldValue::Decimal)
            .map_err(|_| CoerceError::Conversion(format!("{} is outside the decimal range", n))),
        FieldKind::Float => {
            if n.abs() > f32::MAX as f64 {
                return Err(CoerceError::Conversion(format!(
                    "{} is outside the float range",
                    n
                )));
            }
            Ok(FieldValue::Float(n as f32))
        }
        FieldKind::Double => Ok(FieldValue::Double(n)),
        other => Err(CoerceError::Conversion(format!("{} is not numeric", other))),
    }
}

/// Round to the nearest integer, ties to even (banker's rounding)
pub(crate) fn round_half_even(n: f64) -> f64 {
    if (n - n.trunc()).abs() == 0.5 {
        2.0 * (n / 2.0).round()
    } else {
        n.round()
    }
}

/// Parse date text against an ordered format list.
///
/// Each format is tried as a date-time first and then as a plain date.
pub fn parse_datetime(text: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let text = text.trim();
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    })
}

/// Parse `true`/`false` in any letter case
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse a time span written as `[-][d.]hh:mm[:ss[.fff]]`
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = body.split(':');
    let first = parts.next()?;
    let minutes: i64 = parse_digits(parts.next()?)?;
    let seconds = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (days, hours) = match first.split_once('.') {
        Some((days, hours)) => (parse_digits(days)?, parse_digits(hours)?),
        None => (0, parse_digits(first)?),
    };
    let (seconds, millis) = match seconds {
        Some(s) => match s.split_once('.') {
            Some((whole, fraction)) => (parse_digits(whole)?, parse_millis(fraction)?),
            None => (parse_digits(s)?, 0),
        },
        None => (0, 0),
    };
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total = Duration::days(days)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds)
        + Duration::milliseconds(millis);
    Some(if negative { -total } else { total })
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || s.len() > 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Fractional seconds to milliseconds; digits past the third are dropped
fn parse_millis(fraction: &str) -> Option<i64> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: String = fraction.chars().chain("00".chars()).take(3).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetbind_core::CellError;

    fn formats() -> Vec<String> {
        DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
    }

    fn coerce(value: CellValue, kind: FieldKind) -> Result<Option<FieldValue>, CoerceError> {
        coerce_cell(&value, kind, &formats())
    }

    fn date(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_blank_and_error_cells_are_left_alone() {
        for kind in [FieldKind::Text, FieldKind::Int, FieldKind::DateTime] {
            assert_eq!(coerce(CellValue::Empty, kind), Ok(None));
            assert_eq!(coerce(CellValue::Error(CellError::Div0), kind), Ok(None));
        }
    }

    #[test]
    fn test_text_from_every_tag() {
        let cases = vec![
            (CellValue::String("abc".into()), "abc"),
            (CellValue::Number(2.5), "2.5"),
            (CellValue::Boolean(true), "TRUE"),
            (CellValue::DateTime(date(2024, 1, 5, 0, 0, 0)), "2024-01-05 00:00:00"),
            (CellValue::TimeSpan(Duration::minutes(90)), "01:30:00"),
        ];
        for (cell, expected) in cases {
            assert_eq!(
                coerce(cell, FieldKind::Text),
                Ok(Some(FieldValue::Text(expected.to_string())))
            );
        }
    }

    #[test]
    fn test_datetime_sources() {
        let expected = date(2020, 2, 29, 18, 0, 0);
        assert_eq!(
            coerce(CellValue::Number(43890.75), FieldKind::DateTime),
            Ok(Some(FieldValue::DateTime(expected)))
        );
        assert_eq!(
            coerce(CellValue::String("29.02.2020 18:00".into()), FieldKind::DateTime),
            Ok(Some(FieldValue::DateTime(expected)))
        );
        assert_eq!(
            coerce(CellValue::String("2020-02-29".into()), FieldKind::DateTime),
            Ok(Some(FieldValue::DateTime(date(2020, 2, 29, 0, 0, 0))))
        );
        // unparsable date text is skipped, not reported
        assert_eq!(
            coerce(CellValue::String("next tuesday".into()), FieldKind::DateTime),
            Ok(None)
        );
        assert!(coerce(CellValue::Boolean(true), FieldKind::DateTime).is_err());
    }

    #[test]
    fn test_datetime_offset_sources() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            coerce(
                CellValue::String("2024-03-01T08:00:00+01:00".into()),
                FieldKind::DateTimeOffset
            ),
            Ok(Some(FieldValue::DateTimeOffset(
                offset.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
            )))
        );

        let utc_value = utc().with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap();
        assert_eq!(
            coerce(
                CellValue::DateTime(date(2024, 3, 1, 7, 0, 0)),
                FieldKind::DateTimeOffset
            ),
            Ok(Some(FieldValue::DateTimeOffset(utc_value)))
        );
        assert_eq!(
            coerce(CellValue::String("2024-03-01 07:00".into()), FieldKind::DateTimeOffset),
            Ok(Some(FieldValue::DateTimeOffset(utc_value)))
        );
        assert_eq!(
            coerce(CellValue::String("garbage".into()), FieldKind::DateTimeOffset),
            Ok(None)
        );
    }

    #[test]
    fn test_bool_sources() {
        assert_eq!(
            coerce(CellValue::Number(-2.0), FieldKind::Bool),
            Ok(Some(FieldValue::Bool(true)))
        );
        assert_eq!(
            coerce(CellValue::String(" FALSE ".into()), FieldKind::Bool),
            Ok(Some(FieldValue::Bool(false)))
        );
        assert_eq!(
            coerce(CellValue::String("yes".into()), FieldKind::Bool),
            Err(CoerceError::Parse("yes".into()))
        );
    }

    #[test]
    fn test_time_span_sources() {
        assert_eq!(
            coerce(CellValue::Number(0.25), FieldKind::TimeSpan),
            Ok(Some(FieldValue::TimeSpan(Duration::hours(6))))
        );
        assert_eq!(
            coerce(CellValue::String("1.02:30".into()), FieldKind::TimeSpan),
            Ok(Some(FieldValue::TimeSpan(
                Duration::days(1) + Duration::hours(2) + Duration::minutes(30)
            )))
        );
        assert!(matches!(
            coerce(CellValue::String("2h".into()), FieldKind::TimeSpan),
            Err(CoerceError::Parse(_))
        ));
    }

    #[test]
    fn test_numeric_sources() {
        assert_eq!(
            coerce(CellValue::Number(2.5), FieldKind::Int),
            Ok(Some(FieldValue::Int(2)))
        );
        assert_eq!(
            coerce(CellValue::Number(3.5), FieldKind::Int),
            Ok(Some(FieldValue::Int(4)))
        );
        assert_eq!(
            coerce(CellValue::Boolean(true), FieldKind::Double),
            Ok(Some(FieldValue::Double(1.0)))
        );
        assert_eq!(
            coerce(CellValue::Number(0.1), FieldKind::Decimal),
            Ok(Some(FieldValue::Decimal(Decimal::new(1, 1))))
        );
        assert_eq!(
            coerce(CellValue::String("42".into()), FieldKind::Int),
            Ok(Some(FieldValue::Int(42)))
        );
        assert_eq!(
            coerce(CellValue::String("4.2".into()), FieldKind::Int),
            Err(CoerceError::Parse("4.2".into()))
        );
        // past i64::MAX the digits are handed on for unsigned properties
        assert_eq!(
            coerce(CellValue::String(" 18446744073709551615".into()), FieldKind::Int),
            Ok(Some(FieldValue::Text("18446744073709551615".into())))
        );
        assert_eq!(
            coerce(CellValue::String("18446744073709551616".into()), FieldKind::Int),
            Err(CoerceError::Parse("18446744073709551616".into()))
        );
        assert!(matches!(
            coerce(CellValue::Number(1e20), FieldKind::Int),
            Err(CoerceError::Conversion(_))
        ));
        assert!(matches!(
            coerce(CellValue::Number(1e300), FieldKind::Float),
            Err(CoerceError::Conversion(_))
        ));
    }

    #[test]
    fn test_formula_cells_use_cached_result() {
        let mut formula = CellValue::formula("=A1*2");
        if let CellValue::Formula { cached_value, .. } = &mut formula {
            *cached_value = Some(Box::new(CellValue::Number(8.0)));
        }
        assert_eq!(coerce(formula, FieldKind::Int), Ok(Some(FieldValue::Int(8))));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(0.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(-2.5), -2.0);
        assert_eq!(round_half_even(2.6), 3.0);
    }

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration("00:45"), Some(Duration::minutes(45)));
        assert_eq!(
            parse_duration("-12:00:30.25"),
            Some(-(Duration::hours(12) + Duration::seconds(30) + Duration::milliseconds(250)))
        );
        assert_eq!(parse_duration("24:00"), None);
        assert_eq!(parse_duration("10:61"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration(""), None);
    }
}
