//! HTTP handlers for the size API.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use size_engine::types::{CommitRecord, CommitRecordPayload, HistoryQuery, Report, Review};
use size_engine::{EngineError, IngestOutcome};
use uuid::Uuid;

use crate::date;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{HistoryParams, ReportParams, ReviewPayload};

pub async fn health() -> &'static str {
  "ok"
}

pub async fn create_commit_record(
  State(state): State<Arc<AppState>>,
  Path(project_id): Path<String>,
  payload: Result<Json<CommitRecordPayload>, JsonRejection>,
) -> Result<Json<IngestOutcome>, ApiError> {
  let Json(payload) = payload?;
  let outcome = state.engine.ingest(&project_id, &payload).await?;
  Ok(Json(outcome))
}

pub async fn list_commit_records(
  State(state): State<Arc<AppState>>,
  Path(project_id): Path<String>,
  params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<CommitRecord>>, ApiError> {
  let Query(params) = params?;
  let older_than = match params.older_than.as_deref() {
    Some(raw) => Some(
      date::parse_timestamp(raw)
        .ok_or_else(|| EngineError::validation("olderThan", "expected an RFC3339 timestamp"))?,
    ),
    None => None,
  };

  let query = HistoryQuery {
    sub_project: params.sub_project,
    branch: params.branch,
    latest: params.latest.unwrap_or(false),
    resolution: params.resolution.unwrap_or_default(),
    older_than,
  };
  let records = state.engine.history(&project_id, &query).await?;
  Ok(Json(records))
}

pub async fn get_report(
  State(state): State<Arc<AppState>>,
  Path((project_id, record_id)): Path<(String, Uuid)>,
  params: Result<Query<ReportParams>, QueryRejection>,
) -> Result<Json<Report>, ApiError> {
  let Query(params) = params?;
  let compare_to = params.compare_to.unwrap_or_default();
  let report = state.engine.report(&project_id, record_id, compare_to).await?;
  Ok(Json(report))
}

pub async fn review_commit_record(
  State(state): State<Arc<AppState>>,
  Path((project_id, record_id)): Path<(String, Uuid)>,
  payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
  let Json(payload) = payload?;
  let review = Review {
    user: payload.user,
    resolution: payload.resolution,
    created_at: Utc::now(),
  };
  let report = state.engine.review(&project_id, record_id, &review).await?;
  Ok(Json(report))
}

pub async fn list_sub_projects(
  State(state): State<Arc<AppState>>,
  Path(project_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
  let names = state.engine.sub_projects(&project_id).await?;
  Ok(Json(names))
}
