//! Bundle size diff engine: deterministic, rule-based.
//!
//! Diffs a new snapshot of file sizes against a baseline, applies per-file limits,
//! resolves the baseline record from stored history, down-samples history into trend
//! points and finalizes report status (merge auto-pass, human reviews).
//!
//! Everything except the `RecordStore` calls is pure computation.

pub mod bucket;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod limits;
pub mod memory;
pub mod report;
pub mod resolve;
pub mod store;
pub mod types;

pub use config::Config;
pub use engine::{Engine, IngestOutcome};
pub use error::{EngineError, StoreError};
pub use memory::MemoryRecordStore;
pub use store::RecordStore;
pub use types::{CommitRecord, CommitRecordPayload, FileMetric, Report};

use serde::{Deserialize, Serialize};

/// Input of the stdin/stdout binary: current snapshot plus optional base snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffInput {
  #[serde(default)]
  pub files: Vec<FileMetric>,
  #[serde(default)]
  pub groups: Vec<FileMetric>,
  #[serde(default)]
  pub base_files: Vec<FileMetric>,
  #[serde(default)]
  pub base_groups: Vec<FileMetric>,
}

/// Structured error output for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
    }
  }
}

/// Run the diff on parsed input (no I/O, no store).
pub fn run(input: &DiffInput) -> types::DiffReport {
  report::diff_report(&input.files, &input.groups, &input.base_files, &input.base_groups)
}
