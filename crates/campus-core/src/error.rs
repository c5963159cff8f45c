//! Error types for `campus-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid login handle: {0:?}")]
  InvalidHandle(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("invalid subject id: {0}")]
  InvalidSubjectId(#[from] uuid::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
