//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use docket_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::Validation(_) => Self::BadRequest(e.to_string()),
      CoreError::TicketNotFound(_)
      | CoreError::CommentNotFound(_)
      | CoreError::WorkspaceNotFound(_)
      | CoreError::UserNotFound(_) => Self::NotFound(e.to_string()),
      CoreError::NotCommentAuthor { .. } | CoreError::SystemComment(_) => {
        Self::Forbidden(e.to_string())
      }
      CoreError::Storage(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
