//! Error type for `campus-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// `create` was called with an id that is already stored.
  #[error("{kind} {id} already exists")]
  AlreadyExists { kind: &'static str, id: uuid::Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
