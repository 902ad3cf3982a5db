//! Mapping of engine errors onto HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use size_engine::{EngineError, StoreError};
use tracing::error;

use crate::types::ErrorBody;

#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
  fn from(e: EngineError) -> Self {
    Self(e)
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    Self(e.into())
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(EngineError::parse(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self(EngineError::parse(rejection.body_text()))
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match &self.0 {
      EngineError::Validation { .. } | EngineError::Parse(_) => StatusCode::BAD_REQUEST,
      EngineError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
      EngineError::Store(StoreError::ReplaceConflict { .. } | StoreError::Backend(_)) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self.0 {
      EngineError::Validation { field, reason } => ErrorBody::new(reason.clone()).with_field(field.clone()),
      EngineError::Store(StoreError::ReplaceConflict { .. } | StoreError::Backend(_)) => {
        error!(error = %self.0, "store failure");
        ErrorBody::new("internal error")
      }
      other => ErrorBody::new(other.to_string()),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_taxonomy_to_status_codes() {
    let cases = [
      (EngineError::validation("branch", "must not be empty"), StatusCode::BAD_REQUEST),
      (EngineError::parse("bad date"), StatusCode::BAD_REQUEST),
      (StoreError::not_found("commit record", "x").into(), StatusCode::NOT_FOUND),
      (
        StoreError::ReplaceConflict {
          project_id: "p".into(),
          commit_sha: "c".into(),
        }
        .into(),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      (StoreError::backend("down").into(), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(ApiError(err).status(), expected);
    }
  }
}
