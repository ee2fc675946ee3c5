//! The letter lifecycle guard.
//!
//! [`LetterService`] wraps a [`DeliveryStore`] and is the only path through
//! which letters are created or change status. It validates entity references
//! at creation and enforces the forward-only status chain on update; all
//! checks run before any write, so a failed operation writes nothing.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  customer::SenderSummary,
  letter::{
    LetterStatus, LetterWithParties, LetterWithRefs, NewLetter,
  },
  pigeon::PigeonSummary,
  store::DeliveryStore,
};

/// The guard component. The store is an explicit constructor dependency;
/// cloning is cheap (`Arc` inside).
#[derive(Clone)]
pub struct LetterService<S> {
  store: Arc<S>,
}

impl<S: DeliveryStore> LetterService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Create a letter.
  ///
  /// Preconditions, checked in order:
  /// 1. the sender customer exists;
  /// 2. the pigeon exists;
  /// 3. the pigeon is active.
  ///
  /// The persisted letter starts `Queued` regardless of caller intent (the
  /// input type has no status field). The returned view reuses the records
  /// loaded for the checks, so creation costs no extra join.
  pub async fn create(&self, input: NewLetter) -> Result<LetterWithParties> {
    let sender = self
      .store
      .get_customer(input.sender_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::SenderNotFound(input.sender_id))?;

    let pigeon = self
      .store
      .get_pigeon(input.pigeon_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::PigeonNotFound(input.pigeon_id))?;

    if !pigeon.is_active {
      return Err(Error::PigeonRetired {
        id:       pigeon.id,
        nickname: pigeon.nickname,
      });
    }

    let letter = self
      .store
      .insert_letter(input)
      .await
      .map_err(Into::into)?;

    Ok(LetterWithParties {
      letter,
      sender: SenderSummary::from(&sender),
      pigeon: PigeonSummary::from(&pigeon),
    })
  }

  /// Advance a letter's status by one step.
  ///
  /// The terminal check runs before the transition table, so a delivered
  /// letter rejects every target — `Delivered -> Delivered` included. The
  /// write itself is conditional on the status we read; if a concurrent
  /// writer got there first the operation fails with a conflict rather than
  /// silently re-applying.
  pub async fn update_status(
    &self,
    id: Uuid,
    new_status: LetterStatus,
  ) -> Result<LetterWithRefs> {
    let current = self
      .store
      .get_letter(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::LetterNotFound(id))?;

    if current.status.is_terminal() {
      return Err(Error::DeliveredImmutable(id));
    }

    if !current.status.can_advance_to(new_status) {
      return Err(Error::InvalidTransition {
        from: current.status,
        to:   new_status,
      });
    }

    self
      .store
      .update_letter_status(id, current.status, new_status)
      .await
      .map_err(Into::into)?
      .ok_or(Error::StatusRaced(id))
  }

  /// All letters, newest first, with party summaries. No guard logic.
  pub async fn list(&self) -> Result<Vec<LetterWithParties>> {
    self.store.list_letters().await.map_err(Into::into)
  }

  /// One letter with party summaries; not-found is an error here, matching
  /// the single-resource read semantics of the API.
  pub async fn get(&self, id: Uuid) -> Result<LetterWithParties> {
    self
      .store
      .get_letter_with_parties(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::LetterNotFound(id))
  }

  /// Pure read filter: letters matching `status` exactly, newest first.
  pub async fn find_by_status(
    &self,
    status: LetterStatus,
  ) -> Result<Vec<LetterWithRefs>> {
    self
      .store
      .list_letters_by_status(status)
      .await
      .map_err(Into::into)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn queued_advances_only_to_sent() {
    assert!(LetterStatus::Queued.can_advance_to(LetterStatus::Sent));
    assert!(!LetterStatus::Queued.can_advance_to(LetterStatus::Delivered));
    assert!(!LetterStatus::Queued.can_advance_to(LetterStatus::Queued));
  }

  #[test]
  fn sent_advances_only_to_delivered() {
    assert!(LetterStatus::Sent.can_advance_to(LetterStatus::Delivered));
    assert!(!LetterStatus::Sent.can_advance_to(LetterStatus::Queued));
    assert!(!LetterStatus::Sent.can_advance_to(LetterStatus::Sent));
  }

  #[test]
  fn delivered_is_terminal() {
    assert!(LetterStatus::Delivered.is_terminal());
    assert_eq!(LetterStatus::Delivered.next(), None);
    for target in [
      LetterStatus::Queued,
      LetterStatus::Sent,
      LetterStatus::Delivered,
    ] {
      assert!(!LetterStatus::Delivered.can_advance_to(target));
    }
  }

  #[test]
  fn invalid_transition_message_names_the_valid_chain() {
    let err = Error::InvalidTransition {
      from: LetterStatus::Queued,
      to:   LetterStatus::Delivered,
    };
    let msg = err.to_string();
    assert!(msg.contains("QUEUED -> SENT -> DELIVERED"), "{msg}");
    assert!(msg.contains("QUEUED -> DELIVERED"), "{msg}");
  }
}
