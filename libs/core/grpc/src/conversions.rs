//! Generic protobuf ↔ domain conversions
//!
//! The task list wire format carries timestamps as RFC3339 strings and uses
//! proto3 scalar defaults (empty string) for "absent". These helpers keep
//! both conventions in one place:
//! - Timestamps (domain DateTime<Utc> ↔ RFC3339 text, microsecond precision, `Z` suffix)
//! - Optional strings (proto3 empty string ↔ Option<String>)
//!
//! ## Usage
//!
//! ```ignore
//! use grpc_client::conversions::*;
//! use chrono::Utc;
//!
//! let now = truncate_to_micros(Utc::now());
//! let text = datetime_to_rfc3339(now);
//! let back = rfc3339_to_datetime(&text).unwrap();
//! assert_eq!(now, back);
//! ```

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

// ============================================================================
// Timestamp Conversions (RFC3339 text ↔ DateTime<Utc>)
// ============================================================================

/// Drop sub-microsecond precision so a value survives a text round trip
/// unchanged.
pub fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.trunc_subsecs(6)
}

/// Format as RFC3339 with a fixed six-digit fraction and a `Z` suffix.
///
/// The fixed width keeps lexicographic order equal to chronological order,
/// which the store relies on when sorting the text column.
///
/// # Example
/// ```ignore
/// let dt = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap().with_timezone(&Utc);
/// assert_eq!(datetime_to_rfc3339(dt), "2024-01-02T03:04:05.000000Z");
/// ```
pub fn datetime_to_rfc3339(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse RFC3339 text (any offset) into UTC.
pub fn rfc3339_to_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Proto3 string presence
// ============================================================================

/// Proto3 strings have no presence bit: treat empty as absent.
pub fn non_empty(value: String) -> Option<String> {
  if value.is_empty() { None } else { Some(value) }
}

/// Inverse of [`non_empty`].
pub fn opt_to_string(value: Option<String>) -> String {
  value.unwrap_or_default()
}
