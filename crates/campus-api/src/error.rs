//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::ValidationError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("precondition failed")]
  PreconditionFailed,

  #[error("conflict: {0}")]
  Conflict(String),

  /// A defect on our side (schema drift). Logged, never shown verbatim.
  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl From<campus_core::Error> for ApiError {
  fn from(e: campus_core::Error) -> Self {
    match e {
      campus_core::Error::Validation(v) => Self::Validation(v),
      other @ campus_core::Error::NotApplicable { .. } => {
        Self::Internal(other.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(v) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": v.to_string(), "violations": v.errors })),
      )
        .into_response(),
      ApiError::PreconditionFailed => (
        StatusCode::PRECONDITION_FAILED,
        Json(json!({ "error": "precondition failed" })),
      )
        .into_response(),
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        internal()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        internal()
      }
    }
  }
}

fn internal() -> Response {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "internal server error" })),
  )
    .into_response()
}
