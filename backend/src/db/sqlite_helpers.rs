//! SQLite helper utilities for type conversion
//!
//! SQLite has no native timestamp or fixed-point decimal type. This module
//! provides the conversions used by the repositories:
//! - timestamps are stored as fixed-width UTC RFC 3339 TEXT so that string
//!   comparison matches chronological order
//! - money is stored as INTEGER cents

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

// ============================================================================
// Timestamp Helpers (stored as ISO8601 TEXT in SQLite)
// ============================================================================

/// Current UTC time, truncated to the precision stored in the database
#[inline]
pub fn now_utc() -> DateTime<Utc> {
    truncate_to_micros(Utc::now())
}

/// Drop sub-microsecond precision so a value survives a database round trip
#[inline]
pub fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(dt.timestamp_micros()).unwrap_or(dt)
}

/// Convert a chrono DateTime to the fixed-width storage format
/// (`2024-01-31T09:15:00.000000Z`)
#[inline]
pub fn datetime_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored or user-supplied timestamp.
///
/// Accepts RFC 3339, SQLite's `YYYY-MM-DD HH:MM[:SS]` format and bare
/// `YYYY-MM-DD` dates (midnight UTC).
pub fn str_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| anyhow!("Invalid datetime '{}'", s))
}

/// Decode a TEXT timestamp column from a row
pub fn get_datetime(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    str_to_datetime(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

// ============================================================================
// Money Helpers (stored as INTEGER cents in SQLite)
// ============================================================================

/// Convert stored cents into a two-decimal amount
#[inline]
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Decode an INTEGER cents column from a row
pub fn get_amount(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let cents: i64 = row.try_get(column)?;
    Ok(cents_to_decimal(cents))
}

// ============================================================================
// Substring Matching
// ============================================================================

/// Build a case-insensitive `REGEXP` pattern matching `needle` literally.
///
/// SQLite's `LIKE` and `lower()` only fold ASCII; the `regex` crate behind
/// `REGEXP` folds full Unicode.
pub fn contains_regex(needle: &str) -> String {
    format!("(?i){}", regex::escape(needle))
}
