//! Core types for the size engine (JSON contracts + stored records).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Snapshot types (what CI measures for one build)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
  #[default]
  None,
  Gzip,
  Brotli,
}

/// One measured file (or one pattern group) in a snapshot. Identity within a snapshot is `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetric {
  pub pattern: String,
  pub path: String,
  /// Size in bytes.
  pub size: u64,
  #[serde(default)]
  pub compression: Compression,
  /// Absolute ceiling in bytes. `0` behaves as unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_size: Option<u64>,
  /// Allowed growth in percent against the base. `0` or negative behaves as unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_percent_increase: Option<f64>,
}

impl FileMetric {
  /// A metric whose pattern is its own path, without limits.
  pub fn new(path: impl Into<String>, size: u64) -> Self {
    let path = path.into();
    Self {
      pattern: path.clone(),
      path,
      size,
      compression: Compression::None,
      max_size: None,
      max_percent_increase: None,
    }
  }

  pub fn with_max_size(mut self, max_size: u64) -> Self {
    self.max_size = Some(max_size);
    self
  }

  pub fn with_max_percent_increase(mut self, percent: f64) -> Self {
    self.max_percent_increase = Some(percent);
    self
  }
}

// ---------------------------------------------------------------------------
// Diff output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
  #[default]
  Pass,
  Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffChange {
  Add,
  Remove,
  Update,
  NoChange,
}

/// Ordered as reported: `MaxSize` before `MaxPercentIncrease`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailReason {
  MaxSize,
  MaxPercentIncrease,
}

/// Byte and percent delta. `percent` may be `+inf` when the base is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeDiff {
  pub bytes: i64,
  pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileChange {
  pub bytes: i64,
  pub percent: f64,
  pub change: DiffChange,
}

/// Per-path comparison entry: the present side's metric plus delta and limit verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
  #[serde(flatten)]
  pub metric: FileMetric,
  pub diff: FileChange,
  pub status: Status,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub fail_reasons: Vec<FailReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
  pub curr_branch_size: u64,
  pub base_branch_size: u64,
  pub diff: SizeDiff,
}

/// Result of diffing one list (files or groups) against its base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDiff {
  pub files: Vec<FileDiff>,
  pub stats: DiffStats,
  pub status: Status,
}

// ---------------------------------------------------------------------------
// Commit records (stored history)
// ---------------------------------------------------------------------------

/// Which kind of project produced a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RecordOrigin {
  /// Plain project authenticated by API key.
  #[default]
  #[serde(rename = "apiKey")]
  ApiKey,
  /// Project linked to a GitHub repository.
  #[serde(rename = "github")]
  GitHub {
    owner: String,
    repo: String,
    /// Opaque results of GitHub posting (checks, comments). Never read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outputs: Option<serde_json::Value>,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUser {
  pub provider: String,
  pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResolution {
  Approved,
  Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub user: ReviewUser,
  pub resolution: ReviewResolution,
  pub created_at: DateTime<Utc>,
}

/// Upload from CI. Validated upstream; the engine only checks identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecordPayload {
  pub branch: String,
  pub commit_sha: String,
  #[serde(default)]
  pub base_branch: Option<String>,
  #[serde(default)]
  pub pr_number: Option<String>,
  #[serde(default)]
  pub sub_project: Option<String>,
  #[serde(default)]
  pub files: Vec<FileMetric>,
  #[serde(default)]
  pub groups: Vec<FileMetric>,
  #[serde(default)]
  pub origin: RecordOrigin,
}

/// One stored snapshot. Unique on `(project_id, sub_project, commit_sha)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
  pub id: Uuid,
  pub project_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sub_project: Option<String>,
  pub branch: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub base_branch: Option<String>,
  pub commit_sha: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pr_number: Option<String>,
  pub creation_date: DateTime<Utc>,
  pub files: Vec<FileMetric>,
  pub groups: Vec<FileMetric>,
  #[serde(default)]
  pub reviews: Vec<Review>,
  #[serde(default)]
  pub origin: RecordOrigin,
}

impl CommitRecord {
  /// Build a fresh record from a payload. Stores keep the prior id on replace.
  pub fn from_payload(
    id: Uuid,
    project_id: &str,
    payload: &CommitRecordPayload,
    creation_date: DateTime<Utc>,
  ) -> Self {
    Self {
      id,
      project_id: project_id.to_string(),
      sub_project: payload.sub_project.clone(),
      branch: payload.branch.clone(),
      base_branch: payload.base_branch.clone(),
      commit_sha: payload.commit_sha.clone(),
      pr_number: payload.pr_number.clone(),
      creation_date,
      files: payload.files.clone(),
      groups: payload.groups.clone(),
      reviews: Vec::new(),
      origin: payload.origin.clone(),
    }
  }

  /// Branch whose history this record is compared against.
  pub fn scope_branch(&self) -> &str {
    self.base_branch.as_deref().unwrap_or(&self.branch)
  }
}

// ---------------------------------------------------------------------------
// Report (what callers post to GitHub / print / render)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sub_project: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub link_to_report: Option<String>,
  pub record: CommitRecord,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_record: Option<CommitRecord>,
}

/// Files and groups diff without record context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
  pub files: Vec<FileDiff>,
  pub groups: Vec<FileDiff>,
  pub stats: DiffStats,
  pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub files: Vec<FileDiff>,
  pub groups: Vec<FileDiff>,
  pub stats: DiffStats,
  pub status: Status,
  pub metadata: ReportMetadata,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
  #[default]
  All,
  Days,
  Weeks,
  Months,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareTo {
  #[default]
  PreviousCommit,
  LatestCommit,
}

/// Scoped query against the store: one project, one subproject bucket, one branch.
/// Results come back newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeQuery {
  pub sub_project: Option<String>,
  pub branch: String,
  /// Strict upper bound on `creation_date`.
  pub older_than: Option<DateTime<Utc>>,
  pub limit: usize,
}

impl ScopeQuery {
  pub fn new(sub_project: Option<String>, branch: impl Into<String>, limit: usize) -> Self {
    Self {
      sub_project,
      branch: branch.into(),
      older_than: None,
      limit,
    }
  }

  pub fn older_than(mut self, ts: DateTime<Utc>) -> Self {
    self.older_than = Some(ts);
    self
  }
}

/// History request for the trend view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
  pub sub_project: Option<String>,
  pub branch: String,
  pub latest: bool,
  pub resolution: Resolution,
  pub older_than: Option<DateTime<Utc>>,
}
