//! Record store contract: the only boundary that touches shared mutable state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{CommitRecord, CommitRecordPayload, Review, ScopeQuery};

/// Persistence for commit records.
///
/// Implementations must make `upsert_by_identity` and `append_review` single atomic
/// operations: concurrent CI re-runs with the same identity never create duplicates.
#[async_trait]
pub trait RecordStore: Send + Sync {
  /// Insert, or replace in place, the record keyed by
  /// `(project_id, payload.sub_project, payload.commit_sha)`.
  ///
  /// A replaced record keeps its id and reviews; content and `creation_date` are refreshed.
  async fn upsert_by_identity(
    &self,
    project_id: &str,
    payload: &CommitRecordPayload,
    creation_date: DateTime<Utc>,
  ) -> Result<CommitRecord, StoreError>;

  async fn find_by_id(&self, project_id: &str, id: Uuid) -> Result<Option<CommitRecord>, StoreError>;

  /// Records of one `(project, subproject, branch)` scope, ordered by `creation_date`.
  async fn query_by_scope(&self, project_id: &str, query: &ScopeQuery) -> Result<Vec<CommitRecord>, StoreError>;

  /// Non-null subproject names seen in a project.
  async fn distinct_sub_projects(&self, project_id: &str) -> Result<Vec<String>, StoreError>;

  /// Append a review and return the updated record. `NotFound` when the id is not in the project.
  async fn append_review(&self, project_id: &str, record_id: Uuid, review: &Review) -> Result<CommitRecord, StoreError>;

  /// Record the time of the latest upload on the project. Best effort for callers.
  async fn touch_project(&self, project_id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}
