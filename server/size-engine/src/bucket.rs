//! History down-sampling: one point per calendar day, ISO week or month.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::{CommitRecord, Resolution};

/// Calendar bucket key for a timestamp, or `None` when every record is its own point.
pub fn bucket_key(ts: &DateTime<Utc>, resolution: Resolution) -> Option<String> {
  match resolution {
    Resolution::All => None,
    Resolution::Days => Some(ts.format("%Y-%j").to_string()),
    Resolution::Weeks => Some(ts.format("%G-W%V").to_string()),
    Resolution::Months => Some(ts.format("%Y-%m").to_string()),
  }
}

/// Reduce a scoped history to trend points, newest first.
///
/// Within a bucket only the most recent record survives; sizes are point-in-time facts
/// and are never averaged. `latest` short-circuits to the single newest record.
pub fn bucket_history(
  mut records: Vec<CommitRecord>,
  resolution: Resolution,
  latest: bool,
  max_records: usize,
) -> Vec<CommitRecord> {
  records.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));

  if latest {
    records.truncate(1);
    return records;
  }

  let mut seen = HashSet::new();
  records.retain(|r| match bucket_key(&r.creation_date, resolution) {
    Some(key) => seen.insert(key),
    None => true,
  });
  records.truncate(max_records);
  records
}
