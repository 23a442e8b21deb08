//! Error types for `skillswap-core`.
//!
//! Every service returns this type. Transports map the variants onto their
//! own failure shapes (HTTP status codes, socket error events).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input. Always the caller's fault.
  #[error("{0}")]
  Validation(String),

  /// Registration payload lacked one or more required fields.
  #[error("missing fields: {}", .0.join(", "))]
  MissingFields(Vec<&'static str>),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("password hashing failed: {0}")]
  Hashing(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for failures caused by the server rather than the request.
  pub fn is_internal(&self) -> bool {
    matches!(self, Self::Hashing(_) | Self::Store(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
