//! The `DeliveryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `loft-store-sqlite`).
//! Higher layers (`loft-api`, the lifecycle guard) depend on this
//! abstraction, not on any concrete backend.
//!
//! Conventions:
//! - Absence is expressed as `Option`, never as an error; callers own the
//!   not-found decision.
//! - Backend failures, including unique-constraint violations, live in the
//!   associated `Error` type, which must translate into the core taxonomy.

use std::future::Future;

use uuid::Uuid;

use crate::{
  customer::{
    Customer, CustomerDetail, CustomerUpdate, CustomerWithCount, NewCustomer,
  },
  letter::{Letter, LetterStatus, LetterWithParties, LetterWithRefs, NewLetter},
  pigeon::{NewPigeon, Pigeon, PigeonDetail, PigeonUpdate},
};

/// Abstraction over a Loft persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DeliveryStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Pigeons ───────────────────────────────────────────────────────────

  /// Create and persist a new pigeon; the store assigns id and timestamps
  /// and forces `is_active = true`.
  fn add_pigeon(
    &self,
    input: NewPigeon,
  ) -> impl Future<Output = Result<Pigeon, Self::Error>> + Send + '_;

  /// Retrieve a pigeon by id. Returns `None` if not found.
  fn get_pigeon(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Pigeon>, Self::Error>> + Send + '_;

  /// A pigeon with its assigned letters (newest first), or `None`.
  fn get_pigeon_detail(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PigeonDetail>, Self::Error>> + Send + '_;

  /// List pigeons, newest first. Retired pigeons are excluded unless
  /// `include_retired` is set.
  fn list_pigeons(
    &self,
    include_retired: bool,
  ) -> impl Future<Output = Result<Vec<Pigeon>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the pigeon does not exist.
  fn update_pigeon(
    &self,
    id: Uuid,
    changes: PigeonUpdate,
  ) -> impl Future<Output = Result<Option<Pigeon>, Self::Error>> + Send + '_;

  /// Set `is_active = false`. Returns the updated pigeon, or `None` if it
  /// does not exist. There is no inverse operation.
  fn retire_pigeon(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Pigeon>, Self::Error>> + Send + '_;

  // ── Customers ─────────────────────────────────────────────────────────

  /// Create and persist a new customer; the store assigns id and timestamps.
  fn add_customer(
    &self,
    input: NewCustomer,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  /// Retrieve a customer by id. Returns `None` if not found.
  fn get_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// A customer with their sent letters (newest first), or `None`.
  fn get_customer_detail(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CustomerDetail>, Self::Error>> + Send + '_;

  /// List all customers ordered by name, each with their letter count.
  fn list_customers(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomerWithCount>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the customer does not exist.
  fn update_customer(
    &self,
    id: Uuid,
    changes: CustomerUpdate,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// How many letters name this customer as sender.
  fn count_letters_for_sender(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete a customer row. Returns `false` if no row existed. Callers must
  /// check the letter count first; the foreign-key constraint is only a
  /// backstop.
  fn delete_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Letters ───────────────────────────────────────────────────────────

  /// Persist a new letter. The store assigns id and timestamps and sets
  /// status to [`LetterStatus::Queued`]; the input carries no status field.
  ///
  /// Referential checks are the guard's job, not the store's — this is a
  /// plain insert.
  fn insert_letter(
    &self,
    input: NewLetter,
  ) -> impl Future<Output = Result<Letter, Self::Error>> + Send + '_;

  /// Retrieve a bare letter row by id. Returns `None` if not found.
  fn get_letter(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Letter>, Self::Error>> + Send + '_;

  /// A letter joined with both party summaries, or `None`.
  fn get_letter_with_parties(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LetterWithParties>, Self::Error>> + Send + '_;

  /// All letters with party summaries, newest-created-first.
  fn list_letters(
    &self,
  ) -> impl Future<Output = Result<Vec<LetterWithParties>, Self::Error>> + Send + '_;

  /// Letters whose status equals `status` exactly, newest-created-first,
  /// with minimal party references.
  fn list_letters_by_status(
    &self,
    status: LetterStatus,
  ) -> impl Future<Output = Result<Vec<LetterWithRefs>, Self::Error>> + Send + '_;

  /// Conditionally advance a letter's status: the single-row update applies
  /// only where the current status still equals `expected`. Returns the
  /// updated letter with party references, or `None` when the condition did
  /// not hold (row gone or status changed by a concurrent writer).
  fn update_letter_status(
    &self,
    id: Uuid,
    expected: LetterStatus,
    new_status: LetterStatus,
  ) -> impl Future<Output = Result<Option<LetterWithRefs>, Self::Error>> + Send + '_;
}
