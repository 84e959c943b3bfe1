//! API error type and [`axum::response::IntoResponse`] implementation.

use acta_core::{ErrorKind, signing::SigningError};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// A record-store failure; the HTTP status follows the error's kind.
  #[error("{0}")]
  Store(acta_core::Error),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("object storage error: {0}")]
  Blob(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Signing(#[from] SigningError),
}

impl ApiError {
  pub(crate) fn blob<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Blob(Box::new(err))
  }
}

/// Bridge any store backend error into [`ApiError::Store`].
pub(crate) fn store_err<E: Into<acta_core::Error>>(err: E) -> ApiError {
  ApiError::Store(err.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Store(e) => match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Blob(_) | ApiError::Signing(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
