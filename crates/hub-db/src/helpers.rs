//! Row-to-entity parsing helpers.
//!
//! `SQLite`'s `datetime('now')` default and Rust's `to_rfc3339()` produce
//! different formats; both are accepted on read.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// `SQLite` integers are signed; pull request numbers are not.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for a value that does not fit.
pub fn to_sql_int(value: u64) -> Result<i64, DatabaseError> {
    i64::try_from(value).map_err(|_| DatabaseError::Query(format!("{value} exceeds INTEGER range")))
}

/// # Errors
///
/// Returns `DatabaseError::Query` for a negative value.
pub fn from_sql_int(value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value).map_err(|_| DatabaseError::Query(format!("unexpected negative value {value}")))
}
