//! Snapshot diffing: per-path deltas, change classification and aggregate totals.

use std::collections::{BTreeMap, BTreeSet};

use crate::limits;
use crate::types::{DiffChange, DiffStats, FileChange, FileDiff, FileMetric, SizeDiff, SnapshotDiff, Status};

/// Decimal places kept on finite percent values.
const PERCENT_DECIMALS: i32 = 2;

fn round_decimals(value: f64, decimals: i32) -> f64 {
  let factor = 10f64.powi(decimals);
  // `+ 0.0` folds -0.0 into 0.0.
  (value * factor).round() / factor + 0.0
}

/// Percent change from `base` to `curr`.
///
/// 0 -> 0 is 0; 0 -> positive is `+inf` (kept as is); finite results are rounded
/// to two decimals.
pub fn percent_diff(curr: u64, base: u64) -> f64 {
  if base == 0 {
    return if curr == 0 { 0.0 } else { f64::INFINITY };
  }
  let percent = (curr as f64 - base as f64) / base as f64 * 100.0;
  round_decimals(percent, PERCENT_DECIMALS)
}

/// Signed `curr - base`, saturating at the `i64` range.
pub fn bytes_diff(curr: u64, base: u64) -> i64 {
  let delta = i128::from(curr) - i128::from(base);
  i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}

fn by_path(files: &[FileMetric]) -> BTreeMap<&str, &FileMetric> {
  files.iter().map(|f| (f.path.as_str(), f)).collect()
}

/// Compare the current snapshot against a base snapshot (empty when there is no base).
///
/// Paths are visited in lexicographic order of the union so reports are reproducible.
/// Limits are taken from the current side only.
pub fn diff_snapshots(curr_files: &[FileMetric], base_files: &[FileMetric]) -> SnapshotDiff {
  let curr = by_path(curr_files);
  let base = by_path(base_files);

  let all_paths: BTreeSet<&str> = curr.keys().chain(base.keys()).copied().collect();

  let mut files = Vec::with_capacity(all_paths.len());
  let mut curr_branch_size: u64 = 0;
  let mut base_branch_size: u64 = 0;
  let mut status = Status::Pass;

  for path in all_paths {
    let curr_file = curr.get(path).copied();
    let base_file = base.get(path).copied();

    let curr_size = curr_file.map_or(0, |f| f.size);
    let base_size = base_file.map_or(0, |f| f.size);
    curr_branch_size = curr_branch_size.saturating_add(curr_size);
    base_branch_size = base_branch_size.saturating_add(base_size);

    let bytes = bytes_diff(curr_size, base_size);
    let percent = percent_diff(curr_size, base_size);

    let entry = match (curr_file, base_file) {
      (Some(c), Some(_)) => {
        let change = if bytes == 0 {
          DiffChange::NoChange
        } else {
          DiffChange::Update
        };
        checked_entry(c, bytes, percent, change)
      }
      (Some(c), None) => checked_entry(c, bytes, percent, DiffChange::Add),
      (None, Some(b)) => FileDiff {
        metric: b.clone(),
        diff: FileChange {
          bytes,
          percent,
          change: DiffChange::Remove,
        },
        status: Status::Pass,
        fail_reasons: Vec::new(),
      },
      (None, None) => continue,
    };

    if entry.status == Status::Fail {
      status = Status::Fail;
    }
    files.push(entry);
  }

  SnapshotDiff {
    files,
    stats: DiffStats {
      curr_branch_size,
      base_branch_size,
      diff: SizeDiff {
        bytes: bytes_diff(curr_branch_size, base_branch_size),
        percent: percent_diff(curr_branch_size, base_branch_size),
      },
    },
    status,
  }
}

fn checked_entry(current: &FileMetric, bytes: i64, percent: f64, change: DiffChange) -> FileDiff {
  let (status, fail_reasons) = limits::evaluate(current, percent, change);
  FileDiff {
    metric: current.clone(),
    diff: FileChange {
      bytes,
      percent,
      change,
    },
    status,
    fail_reasons,
  }
}
