//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use loft_core::validate::FieldError;
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

  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Each core error kind maps onto exactly one HTTP class.
impl From<loft_core::Error> for ApiError {
  fn from(e: loft_core::Error) -> Self {
    use loft_core::Error as E;
    match e {
      E::SenderNotFound(_)
      | E::PigeonNotFound(_)
      | E::LetterNotFound(_)
      | E::CustomerNotFound(_) => ApiError::NotFound(e.to_string()),

      E::PigeonRetired { .. } | E::InvalidTransition { .. } => {
        ApiError::BadRequest(e.to_string())
      }

      E::DeliveredImmutable(_)
      | E::StatusRaced(_)
      | E::DuplicateEmail(_)
      | E::DuplicateNickname(_)
      | E::CustomerHasLetters { .. } => ApiError::Conflict(e.to_string()),

      E::Store(inner) => ApiError::Store(inner),
    }
  }
}

/// Shorthand for handlers talking to the store directly: convert a backend
/// error through the core taxonomy into an API error.
pub(crate) fn store_err<E: Into<loft_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

/// Reject the request unless the validator produced no field errors.
pub(crate) fn ensure_valid(errors: Vec<FieldError>) -> Result<(), ApiError> {
  if errors.is_empty() {
    Ok(())
  } else {
    Err(ApiError::Validation(errors))
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
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(fields) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "validation failed", "fields": fields })),
      )
        .into_response(),
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
