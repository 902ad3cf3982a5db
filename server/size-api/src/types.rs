//! Request/response types for the HTTP API.

use serde::{Deserialize, Serialize};
use size_engine::types::{CompareTo, Resolution, ReviewResolution, ReviewUser};

/// Query string of `GET /projects/:project_id/commit-records`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
  pub branch: String,
  #[serde(default)]
  pub sub_project: Option<String>,
  #[serde(default)]
  pub latest: Option<bool>,
  #[serde(default)]
  pub resolution: Option<Resolution>,
  #[serde(default)]
  pub older_than: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
  #[serde(default)]
  pub compare_to: Option<CompareTo>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
  pub user: ReviewUser,
  pub resolution: ReviewResolution,
}

/// Structured error body for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorBody {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
