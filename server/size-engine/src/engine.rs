//! Core engine: ties the record store to base resolution, diffing and report finalization.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bucket;
use crate::config::Config;
use crate::error::{EngineError, StoreError};
use crate::report;
use crate::resolve;
use crate::store::RecordStore;
use crate::types::*;

/// A stored record plus the report computed right after ingesting it.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
  pub record: CommitRecord,
  pub report: Report,
}

/// The size engine. Holds a single store handle shared by every request.
#[derive(Clone)]
pub struct Engine {
  config: Config,
  store: Arc<dyn RecordStore>,
}

impl Engine {
  pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
    Self { config, store }
  }

  pub fn with_defaults(store: Arc<dyn RecordStore>) -> Self {
    Self::new(Config::default(), store)
  }

  /// Store an upload and report on it.
  ///
  /// PR uploads are compared with the latest commit of their base branch, plain pushes
  /// with the previous commit.
  pub async fn ingest(&self, project_id: &str, payload: &CommitRecordPayload) -> Result<IngestOutcome, EngineError> {
    self.ingest_at(project_id, payload, Utc::now()).await
  }

  pub async fn ingest_at(
    &self,
    project_id: &str,
    payload: &CommitRecordPayload,
    now: DateTime<Utc>,
  ) -> Result<IngestOutcome, EngineError> {
    validate_payload(payload)?;

    let record = self.store.upsert_by_identity(project_id, payload, now).await?;

    if let Err(e) = self.store.touch_project(project_id, now).await {
      warn!(project_id, error = %e, "failed to update project last record time");
    }

    let report = self.build_report(&record, default_compare_to(&record)).await?;

    info!(
      project_id,
      record_id = %record.id,
      commit_sha = %record.commit_sha,
      branch = %record.branch,
      sub_project = record.sub_project.as_deref().unwrap_or("-"),
      status = ?report.status,
      "ingested commit record"
    );
    Ok(IngestOutcome { record, report })
  }

  /// Report for a stored record against its base.
  pub async fn report(&self, project_id: &str, record_id: Uuid, compare_to: CompareTo) -> Result<Report, EngineError> {
    let record = self
      .store
      .find_by_id(project_id, record_id)
      .await?
      .ok_or_else(|| StoreError::not_found("commit record", record_id))?;
    self.build_report(&record, compare_to).await
  }

  /// Append a human review and return the re-finalized report, compared the same way as on ingest.
  pub async fn review(&self, project_id: &str, record_id: Uuid, review: &Review) -> Result<Report, EngineError> {
    let record = self.store.append_review(project_id, record_id, review).await?;
    info!(
      project_id,
      record_id = %record.id,
      reviewer = %review.user.name,
      resolution = ?review.resolution,
      "review recorded"
    );
    self.build_report(&record, default_compare_to(&record)).await
  }

  /// Down-sampled history of one scope, newest first.
  pub async fn history(&self, project_id: &str, query: &HistoryQuery) -> Result<Vec<CommitRecord>, EngineError> {
    if query.branch.is_empty() {
      return Err(EngineError::validation("branch", "must not be empty"));
    }

    // Bucketing needs the whole scope, otherwise old buckets fall off behind dense recent ones.
    // The cap applies to the bucketed points.
    let limit = match (query.latest, query.resolution) {
      (true, _) => 1,
      (false, Resolution::All) => self.config.history_max_records,
      (false, _) => usize::MAX,
    };
    let mut scope = ScopeQuery::new(query.sub_project.clone(), query.branch.clone(), limit);
    scope.older_than = query.older_than;

    let records = self.store.query_by_scope(project_id, &scope).await?;
    Ok(bucket::bucket_history(
      records,
      query.resolution,
      query.latest,
      self.config.history_max_records,
    ))
  }

  pub async fn sub_projects(&self, project_id: &str) -> Result<Vec<String>, EngineError> {
    let mut names = self.store.distinct_sub_projects(project_id).await?;
    names.sort();
    Ok(names)
  }

  async fn build_report(&self, record: &CommitRecord, compare_to: CompareTo) -> Result<Report, EngineError> {
    let base = resolve::resolve_base(self.store.as_ref(), record, compare_to).await?;
    let link = self
      .config
      .app_domain
      .as_deref()
      .map(|domain| report::link_to_report(domain, record, compare_to));
    Ok(report::generate_report(record, base.as_ref(), link))
  }
}

/// PR uploads track the latest commit of their base branch, plain pushes the previous commit.
fn default_compare_to(record: &CommitRecord) -> CompareTo {
  if record.pr_number.is_some() {
    CompareTo::LatestCommit
  } else {
    CompareTo::PreviousCommit
  }
}

fn validate_payload(payload: &CommitRecordPayload) -> Result<(), EngineError> {
  if payload.branch.is_empty() {
    return Err(EngineError::validation("branch", "must not be empty"));
  }
  if payload.commit_sha.is_empty() {
    return Err(EngineError::validation("commitSha", "must not be empty"));
  }
  if payload.base_branch.as_deref() == Some("") {
    return Err(EngineError::validation("baseBranch", "must not be empty when set"));
  }
  Ok(())
}
