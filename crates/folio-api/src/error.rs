//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use folio_core::{Error as CoreError, StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// An extractor refused the request before the handler ran.
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by its domain kind. Anything without one
  /// (I/O, SQL, decoding, integrity violations) is a server error.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.core() {
      Some(CoreError::NotFound { .. }) => ApiError::NotFound(e.to_string()),
      Some(CoreError::Conflict(_)) => ApiError::Conflict(e.to_string()),
      Some(CoreError::Validation(_)) => ApiError::BadRequest(e.to_string()),
      _ => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Rejected { status, message } => (*status, message.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
