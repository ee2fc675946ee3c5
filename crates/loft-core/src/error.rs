//! Error types for `loft-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::letter::LetterStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sender customer not found: {0}")]
  SenderNotFound(Uuid),

  #[error("pigeon not found: {0}")]
  PigeonNotFound(Uuid),

  #[error("letter not found: {0}")]
  LetterNotFound(Uuid),

  #[error("customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("pigeon {nickname} is retired and cannot carry deliveries")]
  PigeonRetired { id: Uuid, nickname: String },

  #[error("delivered letters are immutable")]
  DeliveredImmutable(Uuid),

  #[error(
    "invalid status transition: {from} -> {to}; the only valid chain is QUEUED -> SENT -> DELIVERED"
  )]
  InvalidTransition {
    from: LetterStatus,
    to:   LetterStatus,
  },

  /// The conditional status write matched no row: another writer advanced
  /// the letter between our read and our write.
  #[error("letter {0} was updated concurrently")]
  StatusRaced(Uuid),

  #[error("a customer with email {0} already exists")]
  DuplicateEmail(String),

  #[error("a pigeon with nickname {0} already exists")]
  DuplicateNickname(String),

  #[error("customer {id} still has {letters} letter(s) and cannot be deleted")]
  CustomerHasLetters { id: Uuid, letters: u64 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
