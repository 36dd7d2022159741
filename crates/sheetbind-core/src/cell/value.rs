//! What a cell holds

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::serial::{datetime_to_serial, duration_to_days};

/// A cell's value. Formulas carry their text and the last calculated result.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Local date and time, no zone
    DateTime(NaiveDateTime),
    TimeSpan(Duration),
    Error(CellError),
    Formula {
        /// Includes the leading `=`
        text: String,
        cached_value: Option<Box<CellValue>>,
    },
}

/// Type of the value a reader sees, formulas resolved to their result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Blank,
    Error,
    Text,
    Number,
    Boolean,
    DateTime,
    TimeSpan,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Blank => "blank",
            CellKind::Error => "error",
            CellKind::Text => "text",
            CellKind::Number => "number",
            CellKind::Boolean => "boolean",
            CellKind::DateTime => "date-time",
            CellKind::TimeSpan => "time-span",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// A formula not yet calculated
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    pub fn is_error(&self) -> bool {
        self.kind() == CellKind::Error
    }

    /// The value itself, or for formulas the cached result (`Empty` if none)
    pub fn effective_value(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(result),
                ..
            } => result.effective_value(),
            CellValue::Formula { .. } => &CellValue::Empty,
            other => other,
        }
    }

    pub fn kind(&self) -> CellKind {
        match self.effective_value() {
            CellValue::Empty | CellValue::Formula { .. } => CellKind::Blank,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Number(_) => CellKind::Number,
            CellValue::String(_) => CellKind::Text,
            CellValue::DateTime(_) => CellKind::DateTime,
            CellValue::TimeSpan(_) => CellKind::TimeSpan,
            CellValue::Error(_) => CellKind::Error,
        }
    }

    /// Numeric reading: booleans are 0/1, dates serial numbers, spans days
    pub fn as_number(&self) -> Option<f64> {
        match self.effective_value() {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(f64::from(u8::from(*b))),
            CellValue::DateTime(dt) => datetime_to_serial(dt),
            CellValue::TimeSpan(d) => Some(duration_to_days(d)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.effective_value() {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<CellError> {
        match self.effective_value() {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Formula pointing into another workbook, as in `[Book.xlsx]Sheet!A1`.
    ///
    /// A structured reference such as `Table[Column]` has no `!` after its
    /// closing bracket and does not count.
    pub fn references_external_workbook(&self) -> bool {
        let Some(text) = self.formula_text() else {
            return false;
        };
        let Some(open) = text.find('[') else {
            return false;
        };
        text[open..]
            .find(']')
            .is_some_and(|close| text[open + close..].contains('!'))
    }

    /// Name used in messages; unlike [`CellValue::kind`] formulas say so
    pub fn type_name(&self) -> &'static str {
        if self.is_formula() {
            "formula"
        } else {
            self.kind().as_str()
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            CellValue::TimeSpan(d) => f.write_str(&format_duration(d)),
            CellValue::Error(e) => write!(f, "{}", e),
            CellValue::Formula {
                cached_value: Some(result),
                ..
            } => write!(f, "{}", result),
            CellValue::Formula { text, .. } => f.write_str(text),
        }
    }
}

/// `[-][d.]hh:mm:ss[.fff]`, the layout time-span text is parsed from
pub fn format_duration(d: &Duration) -> String {
    let sign = if *d < Duration::zero() { "-" } else { "" };
    let ms = d.num_milliseconds().unsigned_abs();
    let secs = ms / 1000;
    let days = match secs / 86_400 {
        0 => String::new(),
        n => format!("{}.", n),
    };
    let fraction = match ms % 1000 {
        0 => String::new(),
        n => format!(".{:03}", n),
    };
    format!(
        "{}{}{:02}:{:02}:{:02}{}",
        sign,
        days,
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60,
        fraction
    )
}

macro_rules! impl_from_for_cell_value {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for CellValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

impl_from_for_cell_value! {
    bool => |b| CellValue::Boolean(b),
    i32 => |n| CellValue::Number(f64::from(n)),
    i64 => |n| CellValue::Number(n as f64),
    f64 => |n| CellValue::Number(n),
    &str => |s| CellValue::String(s.to_string()),
    String => |s| CellValue::String(s),
    NaiveDateTime => |dt| CellValue::DateTime(dt),
    NaiveDate => |d| CellValue::DateTime(d.and_time(NaiveTime::MIN)),
    Duration => |d| CellValue::TimeSpan(d),
    CellError => |e| CellValue::Error(e),
}

/// The error values a formula can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

impl CellError {
    const ALL: [CellError; 7] = [
        CellError::Null,
        CellError::Div0,
        CellError::Value,
        CellError::Ref,
        CellError::Name,
        CellError::Num,
        CellError::Na,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Case-insensitive inverse of [`CellError::as_str`]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(text.trim()))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn calculated(text: &str, result: CellValue) -> CellValue {
        CellValue::Formula {
            text: text.into(),
            cached_value: Some(Box::new(result)),
        }
    }

    #[test]
    fn test_formulas_read_as_their_result() {
        assert_eq!(CellValue::formula("=A1").kind(), CellKind::Blank);

        let doubled = calculated("=A1*2", CellValue::Number(4.0));
        assert_eq!(doubled.kind(), CellKind::Number);
        assert_eq!(doubled.as_number(), Some(4.0));
        assert_eq!(doubled.type_name(), "formula");
        assert_eq!(doubled.to_string(), "4");

        let failed = calculated("=1/0", CellValue::Error(CellError::Div0));
        assert!(failed.is_error());
        assert_eq!(failed.as_error(), Some(CellError::Div0));
    }

    #[test]
    fn test_numeric_reading() {
        assert_eq!(CellValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(CellValue::string("7").as_number(), None);
        assert_eq!(CellValue::DateTime(dt(2024, 1, 1, 12, 0)).as_number(), Some(45292.5));
        assert_eq!(CellValue::TimeSpan(Duration::hours(6)).as_number(), Some(0.25));
        assert_eq!(CellValue::Number(-0.5).as_bool(), Some(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Boolean(false).to_string(), "FALSE");
        assert_eq!(CellValue::DateTime(dt(2023, 5, 17, 8, 30)).to_string(), "2023-05-17 08:30:00");
        assert_eq!(CellValue::TimeSpan(Duration::minutes(90)).to_string(), "01:30:00");
        assert_eq!(CellValue::Error(CellError::Na).to_string(), "#N/A");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::zero()), "00:00:00");
        assert_eq!(
            format_duration(&(Duration::days(2) + Duration::seconds(3_725))),
            "2.01:02:05"
        );
        assert_eq!(format_duration(&Duration::milliseconds(-1_500)), "-00:00:01.500");
    }

    #[test]
    fn test_external_reference_detection() {
        assert!(CellValue::formula("='[Prices.xlsx]Sheet1'!B2").references_external_workbook());
        assert!(CellValue::formula("=[1]Rates!A1*2").references_external_workbook());
        assert!(!CellValue::formula("=SUM(Sales[Amount])").references_external_workbook());
        assert!(!CellValue::formula("=Sheet2!A1").references_external_workbook());
        assert!(!CellValue::string("[x]y!z").references_external_workbook());
    }

    #[test]
    fn test_cell_error_parse() {
        assert_eq!(CellError::parse("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::parse("#n/a"), Some(CellError::Na));
        assert_eq!(CellError::parse("invalid"), None);
    }
}
