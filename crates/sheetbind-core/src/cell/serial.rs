//! Excel serial date conversions (1900 date system)
//!
//! Serial 1 is 1900-01-01 and Excel counts a non-existent 1900-02-29, so for
//! every date from 1900-03-01 on the serial is the day count since 1899-12-30.
//! Earlier dates are not supported.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert a date-time to its serial number (fractional days)
pub fn datetime_to_serial(dt: &NaiveDateTime) -> Option<f64> {
    let elapsed = *dt - epoch()?;
    Some(elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY)
}

/// Convert a serial number back to a date-time, rounded to the millisecond
pub fn datetime_from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    epoch()?.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Express a time span as fractional days
pub fn duration_to_days(d: &Duration) -> f64 {
    d.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Convert fractional days to a time span, rounded to the millisecond
pub fn duration_from_days(days: f64) -> Option<Duration> {
    if !days.is_finite() {
        return None;
    }
    let millis = (days * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    Some(Duration::milliseconds(millis as i64))
}
