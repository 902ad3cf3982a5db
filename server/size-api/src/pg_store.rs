//! PostgreSQL `RecordStore`. Every write is one atomic statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use size_engine::types::{CommitRecord, CommitRecordPayload, FileMetric, RecordOrigin, Review, ScopeQuery};
use size_engine::{RecordStore, StoreError};
use sqlx_core::query::query;
use sqlx_core::raw_sql::raw_sql;
use sqlx_core::row::Row;
use sqlx_core::types::Json;
use sqlx_postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use tracing::info;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../migrations/0001_commit_records.sql");

const RECORD_COLUMNS: &str = "id, project_id, sub_project, branch, base_branch, commit_sha, pr_number, \
   creation_date, files, file_groups, reviews, origin";

fn backend(e: sqlx_core::Error) -> StoreError {
  StoreError::backend(e.to_string())
}

fn record_from_row(row: &PgRow) -> Result<CommitRecord, sqlx_core::Error> {
  Ok(CommitRecord {
    id: row.try_get("id")?,
    project_id: row.try_get("project_id")?,
    sub_project: row.try_get("sub_project")?,
    branch: row.try_get("branch")?,
    base_branch: row.try_get("base_branch")?,
    commit_sha: row.try_get("commit_sha")?,
    pr_number: row.try_get("pr_number")?,
    creation_date: row.try_get("creation_date")?,
    files: row.try_get::<Json<Vec<FileMetric>>, _>("files")?.0,
    groups: row.try_get::<Json<Vec<FileMetric>>, _>("file_groups")?.0,
    reviews: row.try_get::<Json<Vec<Review>>, _>("reviews")?.0,
    origin: row.try_get::<Json<RecordOrigin>, _>("origin")?.0,
  })
}

/// Scope filter on the indexed columns, newest first; NULL subproject is matched with `IS NULL`.
fn scope_sql(sub_project: Option<&str>) -> String {
  let sub_project_clause = match sub_project {
    Some(_) => "sub_project = $2",
    None => "($2::text IS NULL AND sub_project IS NULL)",
  };
  format!(
    "SELECT {RECORD_COLUMNS} FROM commit_records \
     WHERE project_id = $1 AND {sub_project_clause} AND branch = $3 \
       AND ($4::timestamptz IS NULL OR creation_date < $4) \
     ORDER BY creation_date DESC LIMIT $5"
  )
}

#[derive(Clone)]
pub struct PgRecordStore {
  pool: PgPool,
}

impl PgRecordStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Connect and make sure the schema exists.
  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await
      .map_err(backend)?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  pub async fn migrate(&self) -> Result<(), StoreError> {
    raw_sql(SCHEMA).execute(&self.pool).await.map_err(backend)?;
    info!("commit_records schema ready");
    Ok(())
  }
}

#[async_trait]
impl RecordStore for PgRecordStore {
  async fn upsert_by_identity(
    &self,
    project_id: &str,
    payload: &CommitRecordPayload,
    creation_date: DateTime<Utc>,
  ) -> Result<CommitRecord, StoreError> {
    let sql = format!(
      r#"
      INSERT INTO commit_records
        (id, project_id, sub_project, branch, base_branch, commit_sha, pr_number,
         creation_date, files, file_groups, reviews, origin)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, '[]'::jsonb, $11)
      ON CONFLICT (project_id, sub_project, commit_sha) DO UPDATE SET
        branch = EXCLUDED.branch,
        base_branch = EXCLUDED.base_branch,
        pr_number = EXCLUDED.pr_number,
        creation_date = EXCLUDED.creation_date,
        files = EXCLUDED.files,
        file_groups = EXCLUDED.file_groups,
        origin = EXCLUDED.origin
      RETURNING {RECORD_COLUMNS}
      "#
    );

    let row = query::<Postgres>(&sql)
      .bind(Uuid::new_v4())
      .bind(project_id)
      .bind(payload.sub_project.as_deref())
      .bind(&payload.branch)
      .bind(payload.base_branch.as_deref())
      .bind(&payload.commit_sha)
      .bind(payload.pr_number.as_deref())
      .bind(creation_date)
      .bind(Json(&payload.files))
      .bind(Json(&payload.groups))
      .bind(Json(&payload.origin))
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;

    match row {
      Some(row) => record_from_row(&row).map_err(backend),
      None => Err(StoreError::ReplaceConflict {
        project_id: project_id.to_string(),
        commit_sha: payload.commit_sha.clone(),
      }),
    }
  }

  async fn find_by_id(&self, project_id: &str, id: Uuid) -> Result<Option<CommitRecord>, StoreError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM commit_records WHERE id = $1 AND project_id = $2");
    let row = query::<Postgres>(&sql)
      .bind(id)
      .bind(project_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.as_ref().map(record_from_row).transpose().map_err(backend)
  }

  async fn query_by_scope(&self, project_id: &str, scope: &ScopeQuery) -> Result<Vec<CommitRecord>, StoreError> {
    let sql = scope_sql(scope.sub_project.as_deref());
    let limit = i64::try_from(scope.limit).unwrap_or(i64::MAX);
    let rows = query::<Postgres>(&sql)
      .bind(project_id)
      .bind(scope.sub_project.as_deref())
      .bind(&scope.branch)
      .bind(scope.older_than)
      .bind(limit)
      .fetch_all(&self.pool)
      .await
      .map_err(backend)?;
    rows.iter().map(record_from_row).collect::<Result<_, _>>().map_err(backend)
  }

  async fn distinct_sub_projects(&self, project_id: &str) -> Result<Vec<String>, StoreError> {
    let rows = query::<Postgres>(
      "SELECT DISTINCT sub_project FROM commit_records \
       WHERE project_id = $1 AND sub_project IS NOT NULL ORDER BY sub_project",
    )
    .bind(project_id)
    .fetch_all(&self.pool)
    .await
    .map_err(backend)?;
    rows
      .iter()
      .map(|row| row.try_get::<String, _>("sub_project"))
      .collect::<Result<_, _>>()
      .map_err(backend)
  }

  async fn append_review(&self, project_id: &str, record_id: Uuid, review: &Review) -> Result<CommitRecord, StoreError> {
    let sql = format!(
      "UPDATE commit_records SET reviews = reviews || jsonb_build_array($3::jsonb) \
       WHERE id = $1 AND project_id = $2 RETURNING {RECORD_COLUMNS}"
    );
    let row = query::<Postgres>(&sql)
      .bind(record_id)
      .bind(project_id)
      .bind(Json(review))
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?
      .ok_or_else(|| StoreError::not_found("commit record", record_id))?;
    record_from_row(&row).map_err(backend)
  }

  async fn touch_project(&self, project_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    query::<Postgres>(
      "INSERT INTO projects (id, last_record_at) VALUES ($1, $2) \
       ON CONFLICT (id) DO UPDATE SET \
         last_record_at = GREATEST(projects.last_record_at, EXCLUDED.last_record_at)",
    )
    .bind(project_id)
    .bind(at)
    .execute(&self.pool)
    .await
    .map_err(backend)?;
    Ok(())
  }
}
