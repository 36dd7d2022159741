//! Typed property values
//!
//! [`FieldValue`] is what a record property or row-set column holds, as
//! opposed to [`CellValue`], which is what a worksheet cell holds. The
//! [`FieldType`] trait connects a Rust type to its [`FieldKind`] and converts
//! in both directions.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sheetbind_core::CellValue;

/// Declared type of a property or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    Text,
    Int,
    Decimal,
    Float,
    Double,
    Bool,
    DateTime,
    DateTimeOffset,
    TimeSpan,
}

impl FieldKind {
    /// Get the name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Int => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::Bool => "boolean",
            FieldKind::DateTime => "date-time",
            FieldKind::DateTimeOffset => "date-time with offset",
            FieldKind::TimeSpan => "time span",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value
    #[default]
    Null,
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeSpan(Duration),
}

impl FieldValue {
    /// Get the kind of this value, `None` for [`FieldValue::Null`]
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(_) => Some(FieldKind::Text),
            FieldValue::Int(_) => Some(FieldKind::Int),
            FieldValue::Decimal(_) => Some(FieldKind::Decimal),
            FieldValue::Float(_) => Some(FieldKind::Float),
            FieldValue::Double(_) => Some(FieldKind::Double),
            FieldValue::Bool(_) => Some(FieldKind::Bool),
            FieldValue::DateTime(_) => Some(FieldKind::DateTime),
            FieldValue::DateTimeOffset(_) => Some(FieldKind::DateTimeOffset),
            FieldValue::TimeSpan(_) => Some(FieldKind::TimeSpan),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", CellValue::from(self.clone()))
    }
}

/// Write dispatch: how each property value lands in a cell.
///
/// Offset date-times are stored as their UTC instant. Decimals outside the
/// `f64` range fall back to their text form.
impl From<FieldValue> for CellValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => CellValue::Empty,
            FieldValue::Text(s) => CellValue::String(s),
            FieldValue::Int(i) => CellValue::Number(i as f64),
            FieldValue::Decimal(d) => match d.to_f64() {
                Some(n) => CellValue::Number(n),
                None => CellValue::String(d.to_string()),
            },
            FieldValue::Float(f) => CellValue::Number(f as f64),
            FieldValue::Double(d) => CellValue::Number(d),
            FieldValue::Bool(b) => CellValue::Boolean(b),
            FieldValue::DateTime(dt) => CellValue::DateTime(dt),
            FieldValue::DateTimeOffset(dt) => CellValue::DateTime(dt.naive_utc()),
            FieldValue::TimeSpan(d) => CellValue::TimeSpan(d),
        }
    }
}

/// A Rust type usable as a record property
pub trait FieldType: Sized {
    /// Declared kind, drives read-time coercion
    const KIND: FieldKind;

    /// Whether the property accepts "no value"
    const NULLABLE: bool = false;

    fn to_field_value(&self) -> FieldValue;

    /// Convert back from a coerced value, `None` if it does not fit
    fn from_field_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_integer_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Int;

                fn to_field_value(&self) -> FieldValue {
                    // u64/usize above i64::MAX keep their digits as text
                    i64::try_from(*self)
                        .map(FieldValue::Int)
                        .unwrap_or_else(|_| FieldValue::Text(self.to_string()))
                }

                fn from_field_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Int(i) => <$ty>::try_from(i).ok(),
                        FieldValue::Text(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    value.to_field_value()
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldType for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Decimal(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Decimal(d) => Some(d),
            FieldValue::Int(i) => Some(Decimal::from(i)),
            _ => None,
        }
    }
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Double;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Double(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Double(d) => Some(d),
            FieldValue::Float(f) => Some(f as f64),
            FieldValue::Int(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldType for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTime(dt) => Some(dt),
            FieldValue::DateTimeOffset(dt) => Some(dt.naive_local()),
            _ => None,
        }
    }
}

impl FieldType for NaiveDate {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(self.and_time(chrono::NaiveTime::MIN))
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        NaiveDateTime::from_field_value(value).map(|dt| dt.date())
    }
}

impl FieldType for DateTime<FixedOffset> {
    const KIND: FieldKind = FieldKind::DateTimeOffset;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTimeOffset(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTimeOffset(dt) => Some(dt),
            FieldValue::DateTime(naive) => Some(utc().from_utc_datetime(&naive)),
            _ => None,
        }
    }
}

impl FieldType for Duration {
    const KIND: FieldKind = FieldKind::TimeSpan;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::TimeSpan(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::TimeSpan(d) => Some(d),
            _ => None,
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map_or(FieldValue::Null, FieldType::to_field_value)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

/// The zero offset, used for date-times read without one
pub(crate) fn utc() -> FixedOffset {
    Utc.fix()
}

macro_rules! impl_from_field_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    value.to_field_value()
                }
            }
        )*
    };
}

impl_from_field_type!(
    String,
    Decimal,
    f32,
    f64,
    bool,
    NaiveDateTime,
    NaiveDate,
    DateTime<FixedOffset>,
    Duration,
);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_dispatch() {
        assert_eq!(CellValue::from(FieldValue::from(7_i32)), CellValue::Number(7.0));
        assert_eq!(
            CellValue::from(FieldValue::from(Decimal::new(1250, 2))),
            CellValue::Number(12.5)
        );
        assert_eq!(CellValue::from(FieldValue::from(true)), CellValue::Boolean(true));
        assert_eq!(
            CellValue::from(FieldValue::from("abc")),
            CellValue::String("abc".into())
        );
        assert_eq!(CellValue::from(FieldValue::from(None::<i32>)), CellValue::Empty);
        assert_eq!(
            CellValue::from(FieldValue::from(u64::MAX)),
            CellValue::String("18446744073709551615".into())
        );
    }

    #[test]
    fn test_offset_writes_utc_instant() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();

        assert_eq!(CellValue::from(FieldValue::from(dt)), CellValue::DateTime(expected));
    }

    #[test]
    fn test_integer_fit() {
        assert_eq!(i32::from_field_value(FieldValue::Int(42)), Some(42));
        assert_eq!(i32::from_field_value(FieldValue::Int(i64::MAX)), None);
        assert_eq!(u8::from_field_value(FieldValue::Int(-1)), None);
        assert_eq!(
            u64::from_field_value(FieldValue::Text("18446744073709551615".into())),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_option_fields() {
        assert!(<Option<f64> as FieldType>::NULLABLE);
        assert_eq!(<Option<f64> as FieldType>::KIND, FieldKind::Double);
        assert_eq!(Option::<f64>::from_field_value(FieldValue::Null), Some(None));
        assert_eq!(
            Option::<bool>::from_field_value(FieldValue::Bool(true)),
            Some(Some(true))
        );
        assert_eq!(Some(3_u16).to_field_value(), FieldValue::Int(3));
    }

    #[test]
    fn test_naive_date_field() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 24).unwrap();
        let value = date.to_field_value();
        assert_eq!(value.kind(), Some(FieldKind::DateTime));
        assert_eq!(NaiveDate::from_field_value(value), Some(date));
    }
}
