//! Date parsing utilities.

use chrono::{DateTime, Utc};

/// Parse an ISO8601 timestamp (any offset) into UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  let dt = DateTime::parse_from_rfc3339(s).ok()?;
  Some(dt.with_timezone(&Utc))
}
