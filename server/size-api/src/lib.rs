//! Bundle Size API
//!
//! HTTP service that stores CI size snapshots as commit records and answers with diff
//! reports. Bind to 127.0.0.1 by default (internal only).

pub mod config;
mod date;
mod error;
mod handlers;
pub mod pg_store;
mod state;
mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{LogFormat, ServerConfig};
pub use error::ApiError;
pub use handlers::health;
pub use pg_store::PgRecordStore;
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route(
      "/projects/:project_id/commit-records",
      post(handlers::create_commit_record).get(handlers::list_commit_records),
    )
    .route(
      "/projects/:project_id/commit-records/:record_id/base",
      get(handlers::get_report),
    )
    .route(
      "/projects/:project_id/commit-records/:record_id/reviews",
      post(handlers::review_commit_record),
    )
    .route("/projects/:project_id/subprojects", get(handlers::list_sub_projects))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
