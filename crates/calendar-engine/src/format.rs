//! Literal date and date-time formats shared by the engine and its callers.
//!
//! The command language accepts, and the presentation layer prints, exactly
//! these two shapes. Edits parse `start`/`end` values with the same helpers so
//! a value printed by a query can be pasted back into an edit.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serializer;

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DDThh:mm`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// `hh:mm`, used when only the time of day is shown.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD` literal.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a `YYYY-MM-DDThh:mm` literal.
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATE_TIME_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(dt: NaiveDateTime) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

pub fn format_time(dt: NaiveDateTime) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Serialize a date-time as `YYYY-MM-DDThh:mm`, so serialized events read
/// back through [`parse_date_time`].
pub fn serialize_date_time<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&dt.format(DATE_TIME_FORMAT))
}
