//! Error type for `folio-store-sqlite`.

use folio_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] folio_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

/// UNIQUE / PRIMARY KEY violations become [`folio_core::Error::Conflict`], so a
/// write that loses a race against a concurrent duplicate reports the same
/// error as one caught by an explicit pre-check.
impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match &e {
      rusqlite::Error::SqliteFailure(failure, msg)
        if failure.code == rusqlite::ErrorCode::ConstraintViolation
          && matches!(
            failure.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
              | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
          ) =>
      {
        let detail = msg.clone().unwrap_or_else(|| "unique constraint failed".into());
        Error::Core(folio_core::Error::Conflict(detail))
      }
      _ => Error::Sqlite(e),
    }
  }
}

impl StoreError for Error {
  fn core(&self) -> Option<&folio_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
