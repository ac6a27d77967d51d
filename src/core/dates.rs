//! Booking date parsing and day offsets
//!
//! Dates arrive as Excel serials, reader-produced ISO strings, or free text.
//! Time of day is always discarded before offsets are taken.

use crate::error::{PivotError, PivotResult};
use crate::types::CellValue;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Largest serial Excel can represent (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Date-only text layouts, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time text layouts without a UTC offset
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse the user-selected reference date (`YYYY-MM-DD`, as an HTML date input sends it)
pub fn parse_reference_date(input: &str) -> PivotResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PivotError::MissingInput(
            "no reference date selected".to_string(),
        ));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| PivotError::InvalidDate(trimmed.to_string()))
}

/// Serial Excel gives to its phantom 1900-02-29
const PHANTOM_LEAP_DAY: f64 = 60.0;

/// Convert a bare numeric serial (1900 date system) to a calendar date.
///
/// Excel counts a 1900-02-29 that never existed, so serials below 60 are
/// shifted by a day and 60 itself lands on 1900-02-28. The fractional part
/// (time of day) is truncated. Date-formatted cells do not come through
/// here: the reader converts them with the workbook's own date system.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor();
    let days = if days < PHANTOM_LEAP_DAY { days + 1.0 } else { days };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days as i64))
}

/// Parse a date written as text, dropping any time-of-day component
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    // Offset-qualified timestamps keep the calendar date as written
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_local().date())
}

/// Interpret a `Booking Date` cell. `None` means the cell is not a date.
pub fn parse_booking_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::DateTimeIso(text) | CellValue::Text(text) => parse_date_text(text),
        CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
    }
}

/// Whole days from the booking date to the reference date.
///
/// Positive when the booking is in the past relative to `reference`.
pub fn day_offset(booking_date: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - booking_date).num_days()
}
