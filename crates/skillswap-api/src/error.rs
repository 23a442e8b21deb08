//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use skillswap_core::Error;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),

  /// The request body, query string or path could not be parsed.
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

/// The message a client may see for `err`. Server-side failures are hidden.
pub fn public_message(err: &Error) -> String {
  if err.is_internal() {
    "internal server error".to_owned()
  } else {
    err.to_string()
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let err = match self {
      ApiError::BadRequest(m) => {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response();
      }
      ApiError::Core(err) => err,
    };

    let status = match &err {
      Error::Validation(_) | Error::MissingFields(_) => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
      Error::Hashing(_) | Error::Store(_) => {
        error!(error = %err, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let body = match &err {
      Error::MissingFields(fields) => json!({
        "error":   "missing required fields",
        "missing": fields,
      }),
      _ => json!({ "error": public_message(&err) }),
    };
    (status, Json(body)).into_response()
  }
}
