//! Parsing of tender due dates.
//!
//! Due dates are compared as naive wall-clock timestamps. A bare date means
//! midnight at the start of that day; a timestamp carrying an offset keeps its
//! wall-clock time in that offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serializer;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a record's due date into a timestamp.
///
/// Returns `None` for anything that is not one of the accepted encodings.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN));
    }

    if let Ok(stamped) = DateTime::parse_from_rfc3339(value) {
        return Some(stamped.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parses a due-date filter value into the last second of that day.
///
/// The filter is an upper bound: "due on or before this day". Any value
/// [`parse_timestamp`] accepts is allowed; only its date part is used.
#[must_use]
pub fn end_of_day(value: &str) -> Option<NaiveDateTime> {
    let date = parse_timestamp(value)?.date();
    date.and_hms_opt(23, 59, 59)
}

/// Validates a `YYYY-MM-DD` date at an input boundary.
///
/// # Errors
///
/// Returns a message naming the expected format if the value does not parse.
pub fn parse_filter_date(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|_| trimmed.to_string())
        .map_err(|e| format!("invalid date '{value}' (expected YYYY-MM-DD): {e}"))
}

/// Formats a timestamp for output, dropping a midnight time component.
#[must_use]
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.time() == NaiveTime::MIN {
        timestamp.format(DATE_FORMAT).to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

pub(crate) fn serialize<S: Serializer>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(timestamp) => serializer.serialize_str(&format_timestamp(timestamp)),
        None => serializer.serialize_none(),
    }
}
