//! Error type for `loft-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown letter status in database: {0:?}")]
  UnknownStatus(String),

  /// UNIQUE violation on `customers.email`.
  #[error("a customer with email {0} already exists")]
  DuplicateEmail(String),

  /// UNIQUE violation on `pigeons.nickname`.
  #[error("a pigeon with nickname {0} already exists")]
  DuplicateNickname(String),
}

/// Translation into the core taxonomy: uniqueness violations become the
/// matching conflict kinds; everything else is an opaque store failure. Raw
/// SQLite errors never cross this boundary.
impl From<Error> for loft_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::DuplicateEmail(email) => loft_core::Error::DuplicateEmail(email),
      Error::DuplicateNickname(nick) => {
        loft_core::Error::DuplicateNickname(nick)
      }
      other => loft_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
