//! Error type for `acta-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] acta_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),
}

/// Collapse into the core taxonomy: domain failures pass through, anything
/// infrastructural becomes Unavailable-kind `Storage`.
impl From<Error> for acta_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(core) => core,
      other => acta_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
