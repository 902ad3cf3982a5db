//! Base record resolution: which prior snapshot a new record is compared against.

use tracing::debug;

use crate::error::StoreError;
use crate::store::RecordStore;
use crate::types::{CommitRecord, CompareTo, ScopeQuery};

/// Find the base record for `record`.
///
/// The scope is `(project, record.sub_project, base_branch ?? branch)`; subprojects never
/// fall back to each other.
/// - `PreviousCommit`: newest record strictly older than `record` (plain pushes).
/// - `LatestCommit`: newest record other than `record` itself, possibly newer than it (PRs against a
///   moving target). Trunk records re-reported this way would otherwise diff against themselves.
///
/// `Ok(None)` when the scope has no other record; the report then treats every file as added.
pub async fn resolve_base(
  store: &dyn RecordStore,
  record: &CommitRecord,
  compare_to: CompareTo,
) -> Result<Option<CommitRecord>, StoreError> {
  let query = match compare_to {
    CompareTo::PreviousCommit => {
      ScopeQuery::new(record.sub_project.clone(), record.scope_branch(), 1).older_than(record.creation_date)
    }
    CompareTo::LatestCommit => ScopeQuery::new(record.sub_project.clone(), record.scope_branch(), 2),
  };

  let base = store
    .query_by_scope(&record.project_id, &query)
    .await?
    .into_iter()
    .find(|candidate| candidate.id != record.id);

  debug!(
    project_id = %record.project_id,
    record_id = %record.id,
    branch = %query.branch,
    ?compare_to,
    base_id = ?base.as_ref().map(|b| b.id),
    "resolved base record"
  );
  Ok(base)
}
