//! Per-file limit checks: absolute size ceiling and percent growth.

use crate::types::{DiffChange, FailReason, FileMetric, Status};

/// Evaluate the current side's configured limits.
///
/// Both limits are checked independently and may both fire. A limit of `0` (or a
/// negative percent) counts as unset, so "fail on any growth" cannot be expressed.
/// Percent growth is only checked for `Update`: an `Add` is an infinite increase.
pub fn evaluate(current: &FileMetric, diff_percent: f64, change: DiffChange) -> (Status, Vec<FailReason>) {
  let mut reasons = Vec::new();

  if let Some(max_size) = current.max_size.filter(|m| *m > 0) {
    if current.size > max_size {
      reasons.push(FailReason::MaxSize);
    }
  }

  if change == DiffChange::Update {
    if let Some(max_percent) = current.max_percent_increase.filter(|p| *p > 0.0) {
      if diff_percent > max_percent {
        reasons.push(FailReason::MaxPercentIncrease);
      }
    }
  }

  let status = if reasons.is_empty() {
    Status::Pass
  } else {
    Status::Fail
  };
  (status, reasons)
}
