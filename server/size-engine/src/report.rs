//! Report assembly: files + groups diff, combined status, and final status overrides.

use crate::diff;
use crate::types::{
  CommitRecord, CompareTo, DiffReport, FileMetric, Report, ReportMetadata, Review, ReviewResolution,
  Status,
};

/// Diff files and groups independently. Stats cover files only; groups re-count the same bytes.
pub fn diff_report(
  curr_files: &[FileMetric],
  curr_groups: &[FileMetric],
  base_files: &[FileMetric],
  base_groups: &[FileMetric],
) -> DiffReport {
  let files = diff::diff_snapshots(curr_files, base_files);
  let groups = diff::diff_snapshots(curr_groups, base_groups);

  let status = if files.status == Status::Fail || groups.status == Status::Fail {
    Status::Fail
  } else {
    Status::Pass
  };

  DiffReport {
    files: files.files,
    groups: groups.files,
    stats: files.stats,
    status,
  }
}

/// Apply overrides to the computed aggregate status, in order:
///
/// 1. Base on the same branch as the record (merge or fast-forward commit) forces `Pass`.
///    This can mask a regression merged to trunk; that trade-off is intended.
/// 2. The last review, if any, decides: `Approved` is `Pass`, `Rejected` is `Fail`.
///
/// Per-file statuses are left alone.
pub fn finalize_status(
  computed: Status,
  record: &CommitRecord,
  base_record: Option<&CommitRecord>,
  reviews: &[Review],
) -> Status {
  let mut status = computed;

  if base_record.is_some_and(|base| base.branch == record.branch) {
    status = Status::Pass;
  }

  if let Some(last) = reviews.last() {
    status = match last.resolution {
      ReviewResolution::Approved => Status::Pass,
      ReviewResolution::Rejected => Status::Fail,
    };
  }

  status
}

/// `{app_domain}/projects/{project}/reports/{record}`, flagged when compared to the latest commit.
pub fn link_to_report(app_domain: &str, record: &CommitRecord, compare_to: CompareTo) -> String {
  let mut link = format!(
    "{}/projects/{}/reports/{}",
    app_domain.trim_end_matches('/'),
    record.project_id,
    record.id
  );
  if compare_to == CompareTo::LatestCommit {
    link.push_str("?compareTo=LATEST_COMMIT");
  }
  link
}

/// Build the final report for a record against its (optional) base, using the record's reviews.
pub fn generate_report(
  record: &CommitRecord,
  base_record: Option<&CommitRecord>,
  link_to_report: Option<String>,
) -> Report {
  let empty = Vec::new();
  let (base_files, base_groups) = match base_record {
    Some(base) => (&base.files, &base.groups),
    None => (&empty, &empty),
  };
  let diff = diff_report(&record.files, &record.groups, base_files, base_groups);
  let status = finalize_status(diff.status, record, base_record, &record.reviews);

  Report {
    files: diff.files,
    groups: diff.groups,
    stats: diff.stats,
    status,
    metadata: ReportMetadata {
      sub_project: record.sub_project.clone(),
      link_to_report,
      record: record.clone(),
      base_record: base_record.cloned(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{CommitRecordPayload, ReviewUser};
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  fn record(branch: &str, files: Vec<FileMetric>) -> CommitRecord {
    let payload = CommitRecordPayload {
      branch: branch.into(),
      commit_sha: format!("sha-{branch}"),
      base_branch: None,
      pr_number: None,
      sub_project: None,
      files,
      groups: Vec::new(),
      origin: Default::default(),
    };
    CommitRecord::from_payload(
      Uuid::new_v4(),
      "proj",
      &payload,
      Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(),
    )
  }

  fn review(resolution: ReviewResolution) -> Review {
    Review {
      user: ReviewUser {
        provider: "github".into(),
        name: "octocat".into(),
      },
      resolution,
      created_at: Utc.with_ymd_and_hms(2025, 1, 15, 11, 0, 0).unwrap(),
    }
  }

  #[test]
  fn group_failure_fails_report() {
    let groups = vec![FileMetric::new("*.js", 500).with_max_size(400)];
    let out = diff_report(&[FileMetric::new("a.js", 1)], &groups, &[], &[]);
    assert_eq!(out.files[0].status, Status::Pass);
    assert_eq!(out.groups[0].status, Status::Fail);
    assert_eq!(out.status, Status::Fail);
    assert_eq!(out.stats.curr_branch_size, 1);
  }

  #[test]
  fn same_branch_base_auto_passes_merge_commits() {
    let rec = record("main", vec![FileMetric::new("a.js", 200).with_max_size(150)]);
    let base = record("main", vec![FileMetric::new("a.js", 150)]);
    let report = generate_report(&rec, Some(&base), None);
    assert_eq!(report.files[0].status, Status::Fail);
    assert_eq!(report.status, Status::Pass);
  }

  #[test]
  fn rejected_review_overrides_same_branch_pass() {
    let rec = record("main", vec![FileMetric::new("a.js", 100)]);
    let base = record("main", vec![FileMetric::new("a.js", 100)]);
    let status = finalize_status(Status::Pass, &rec, Some(&base), &[review(ReviewResolution::Rejected)]);
    assert_eq!(status, Status::Fail);
  }

  #[test]
  fn last_review_wins() {
    let rec = record("feature", vec![]);
    let reviews = vec![review(ReviewResolution::Rejected), review(ReviewResolution::Approved)];
    assert_eq!(finalize_status(Status::Fail, &rec, None, &reviews), Status::Pass);
  }

  #[test]
  fn different_branch_base_keeps_computed_fail() {
    let rec = record("feature", vec![FileMetric::new("a.js", 200).with_max_size(150)]);
    let base = record("main", vec![FileMetric::new("a.js", 150)]);
    let report = generate_report(&rec, Some(&base), None);
    assert_eq!(report.status, Status::Fail);
    assert_eq!(report.metadata.base_record.as_ref().map(|b| b.branch.as_str()), Some("main"));
  }

  #[test]
  fn missing_base_reports_everything_as_added() {
    let rec = record("feature", vec![FileMetric::new("a.js", 10), FileMetric::new("b.js", 20)]);
    let report = generate_report(&rec, None, None);
    assert!(report
      .files
      .iter()
      .all(|f| f.diff.change == crate::types::DiffChange::Add));
    assert_eq!(report.stats.base_branch_size, 0);
    assert_eq!(report.status, Status::Pass);
  }

  #[test]
  fn link_includes_compare_mode() {
    let rec = record("feature", vec![]);
    let link = link_to_report("https://app.example.com/", &rec, CompareTo::LatestCommit);
    assert_eq!(
      link,
      format!("https://app.example.com/projects/proj/reports/{}?compareTo=LATEST_COMMIT", rec.id)
    );
    let link = link_to_report("https://app.example.com", &rec, CompareTo::PreviousCommit);
    assert!(!link.contains('?'));
  }
}
