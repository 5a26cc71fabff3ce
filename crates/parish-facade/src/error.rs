//! Error type for facade storage backends.

use thiserror::Error;

/// A failure inside a storage backend. The [`crate::Facade`] layer converts
/// every one of these into a logged safe default; only code holding a bare
/// backend ever sees them.
#[derive(Debug, Error)]
pub enum BackendError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status: {0}")]
  Status(reqwest::StatusCode),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("backend unavailable: {0}")]
  Unavailable(String),
}

pub type Result<T, E = BackendError> = std::result::Result<T, E>;
