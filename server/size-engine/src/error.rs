//! Structured error types for the size engine.
//!
//! Compute functions never fail; only record store calls (and input validation at the
//! edges) produce these.

use thiserror::Error;

/// Failures surfaced by a `RecordStore`.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("not found: {what} {id}")]
  NotFound { what: &'static str, id: String },

  /// Upsert returned no document. Indicates a broken atomic upsert; never retried.
  #[error("replace conflict: no record returned for {project_id}/{commit_sha}")]
  ReplaceConflict {
    project_id: String,
    commit_sha: String,
  },

  #[error("store backend: {0}")]
  Backend(String),
}

impl StoreError {
  pub fn not_found(what: &'static str, id: impl ToString) -> Self {
    Self::NotFound {
      what,
      id: id.to_string(),
    }
  }

  pub fn backend(msg: impl Into<String>) -> Self {
    Self::Backend(msg.into())
  }
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  /// Request body or query string that does not decode.
  #[error("parse: {0}")]
  Parse(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Store(StoreError::NotFound { .. }))
  }
}
