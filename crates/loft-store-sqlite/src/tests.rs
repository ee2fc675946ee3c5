//! Integration tests for `SqliteStore` against an in-memory database, plus
//! the lifecycle guard driven through the real store.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use loft_core::{
  customer::{
    Customer, CustomerDetail, CustomerUpdate, CustomerWithCount, NewCustomer,
  },
  letter::{
    Letter, LetterStatus, LetterWithParties, LetterWithRefs, NewLetter,
  },
  lifecycle::LetterService,
  pigeon::{NewPigeon, Pigeon, PigeonDetail, PigeonUpdate},
  store::DeliveryStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn pigeon(nickname: &str) -> NewPigeon {
  NewPigeon {
    nickname:      nickname.into(),
    photo_url:     Some(format!("https://example.com/{nickname}.jpg")),
    average_speed: 85.5,
  }
}

fn customer(name: &str, email: &str) -> NewCustomer {
  NewCustomer {
    name:       name.into(),
    email:      email.into(),
    birth_date: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
    address:    "Rua das Flores, 123".into(),
  }
}

fn letter(sender_id: Uuid, pigeon_id: Uuid) -> NewLetter {
  NewLetter {
    content:           "Hello from the loft".into(),
    recipient_name:    "Maria Oliveira".into(),
    recipient_address: "Rua das Palmeiras, 789".into(),
    sender_id,
    pigeon_id,
  }
}

// ─── Pigeons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_pigeon() {
  let s = store().await;

  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();
  assert!(p.is_active, "new pigeons start active");

  let fetched = s.get_pigeon(p.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, p.id);
  assert_eq!(fetched.nickname, "Flash");
  assert_eq!(fetched.average_speed, 85.5);
}

#[tokio::test]
async fn get_pigeon_missing_returns_none() {
  let s = store().await;
  assert!(s.get_pigeon(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_nickname_is_a_conflict() {
  let s = store().await;
  s.add_pigeon(pigeon("Flash")).await.unwrap();

  let err = s.add_pigeon(pigeon("Flash")).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateNickname(ref n) if n == "Flash"));

  // The translation into the core taxonomy preserves the kind.
  let core: loft_core::Error = err.into();
  assert!(matches!(core, loft_core::Error::DuplicateNickname(_)));
}

#[tokio::test]
async fn list_pigeons_excludes_retired_by_default() {
  let s = store().await;
  let flash = s.add_pigeon(pigeon("Flash")).await.unwrap();
  let thunder = s.add_pigeon(pigeon("Thunder")).await.unwrap();
  s.retire_pigeon(thunder.id).await.unwrap();

  let active = s.list_pigeons(false).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, flash.id);

  let all = s.list_pigeons(true).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn update_pigeon_changes_only_given_fields() {
  let s = store().await;
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();

  let updated = s
    .update_pigeon(p.id, PigeonUpdate {
      average_speed: Some(92.0),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.average_speed, 92.0);
  assert_eq!(updated.nickname, "Flash");
  assert_eq!(updated.photo_url, p.photo_url);
}

#[tokio::test]
async fn update_pigeon_missing_returns_none() {
  let s = store().await;
  let result = s
    .update_pigeon(Uuid::new_v4(), PigeonUpdate::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn update_pigeon_to_taken_nickname_is_a_conflict() {
  let s = store().await;
  s.add_pigeon(pigeon("Flash")).await.unwrap();
  let sonic = s.add_pigeon(pigeon("Sonic")).await.unwrap();

  let err = s
    .update_pigeon(sonic.id, PigeonUpdate {
      nickname: Some("Flash".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateNickname(_)));
}

#[tokio::test]
async fn retire_pigeon_is_permanent_and_observable() {
  let s = store().await;
  let p = s.add_pigeon(pigeon("Thunder")).await.unwrap();

  let retired = s.retire_pigeon(p.id).await.unwrap().unwrap();
  assert!(!retired.is_active);

  // No reactivation path exists: a partial update cannot touch is_active.
  let after = s
    .update_pigeon(p.id, PigeonUpdate {
      nickname: Some("Thunderbolt".into()),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert!(!after.is_active);
}

#[tokio::test]
async fn retire_pigeon_missing_returns_none() {
  let s = store().await;
  assert!(s.retire_pigeon(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Customers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_customer() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();

  let fetched = s.get_customer(c.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "joao@example.com");
  assert_eq!(
    fetched.birth_date,
    NaiveDate::from_ymd_opt(1990, 5, 15).unwrap()
  );
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  s.add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();

  let err = s
    .add_customer(customer("Outro João", "joao@example.com"))
    .await
    .unwrap_err();
  assert!(
    matches!(err, crate::Error::DuplicateEmail(ref e) if e == "joao@example.com")
  );
}

#[tokio::test]
async fn update_customer_to_taken_email_is_a_conflict() {
  let s = store().await;
  s.add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let maria = s
    .add_customer(customer("Maria Santos", "maria@example.com"))
    .await
    .unwrap();

  let err = s
    .update_customer(maria.id, CustomerUpdate {
      email: Some("joao@example.com".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn list_customers_is_name_ordered_with_letter_counts() {
  let s = store().await;
  let maria = s
    .add_customer(customer("Maria Santos", "maria@example.com"))
    .await
    .unwrap();
  let joao = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();
  s.insert_letter(letter(maria.id, p.id)).await.unwrap();
  s.insert_letter(letter(maria.id, p.id)).await.unwrap();

  let listed = s.list_customers().await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].customer.id, joao.id);
  assert_eq!(listed[0].letter_count, 0);
  assert_eq!(listed[1].customer.id, maria.id);
  assert_eq!(listed[1].letter_count, 2);
}

#[tokio::test]
async fn delete_customer_without_letters() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();

  assert_eq!(s.count_letters_for_sender(c.id).await.unwrap(), 0);
  assert!(s.delete_customer(c.id).await.unwrap());
  assert!(s.get_customer(c.id).await.unwrap().is_none());

  // Deleting again reports that nothing existed.
  assert!(!s.delete_customer(c.id).await.unwrap());
}

#[tokio::test]
async fn customer_detail_lists_their_letters_with_pigeons() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();
  s.insert_letter(letter(c.id, p.id)).await.unwrap();

  let detail = s.get_customer_detail(c.id).await.unwrap().unwrap();
  assert_eq!(detail.letters.len(), 1);
  assert_eq!(detail.letters[0].pigeon.nickname, "Flash");
}

// ─── Letters: store-level behaviour ──────────────────────────────────────────

#[tokio::test]
async fn insert_letter_always_starts_queued() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();

  let l = s.insert_letter(letter(c.id, p.id)).await.unwrap();
  assert_eq!(l.status, LetterStatus::Queued);

  let fetched = s.get_letter(l.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, LetterStatus::Queued);
}

#[tokio::test]
async fn list_letters_is_newest_first_with_party_summaries() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();

  let first = s.insert_letter(letter(c.id, p.id)).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let second = s.insert_letter(letter(c.id, p.id)).await.unwrap();

  let listed = s.list_letters().await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].letter.id, second.id);
  assert_eq!(listed[1].letter.id, first.id);
  assert_eq!(listed[0].sender.email, "joao@example.com");
  assert_eq!(listed[0].pigeon.nickname, "Flash");
}

#[tokio::test]
async fn conditional_status_update_misses_when_expectation_is_stale() {
  let s = store().await;
  let c = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let p = s.add_pigeon(pigeon("Flash")).await.unwrap();
  let l = s.insert_letter(letter(c.id, p.id)).await.unwrap();

  // Expectation does not match the stored status: no write happens.
  let miss = s
    .update_letter_status(l.id, LetterStatus::Sent, LetterStatus::Delivered)
    .await
    .unwrap();
  assert!(miss.is_none());
  assert_eq!(
    s.get_letter(l.id).await.unwrap().unwrap().status,
    LetterStatus::Queued
  );

  let hit = s
    .update_letter_status(l.id, LetterStatus::Queued, LetterStatus::Sent)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(hit.letter.status, LetterStatus::Sent);
  assert_eq!(hit.sender.name, "João Silva");
  assert_eq!(hit.pigeon.name, "Flash");
}

// ─── The lifecycle guard over the real store ─────────────────────────────────

struct Fixture {
  service:   LetterService<SqliteStore>,
  store:     SqliteStore,
  sender:    Uuid,
  active:    Uuid,
  retired:   Uuid,
}

async fn fixture() -> Fixture {
  let s = store().await;
  let sender = s
    .add_customer(customer("João Silva", "joao@example.com"))
    .await
    .unwrap();
  let flash = s.add_pigeon(pigeon("Flash")).await.unwrap();
  let thunder = s.add_pigeon(pigeon("Thunder")).await.unwrap();
  s.retire_pigeon(thunder.id).await.unwrap();

  Fixture {
    service: LetterService::new(Arc::new(s.clone())),
    store:   s,
    sender:  sender.id,
    active:  flash.id,
    retired: thunder.id,
  }
}

#[tokio::test]
async fn create_letter_attaches_party_summaries() {
  let f = fixture().await;

  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();

  assert_eq!(created.letter.status, LetterStatus::Queued);
  assert_eq!(created.sender.email, "joao@example.com");
  assert_eq!(created.pigeon.nickname, "Flash");
  assert!(created.pigeon.is_active);
}

#[tokio::test]
async fn create_letter_with_unknown_sender_fails_and_writes_nothing() {
  let f = fixture().await;

  let err = f
    .service
    .create(letter(Uuid::new_v4(), f.active))
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::SenderNotFound(_)));
  assert!(f.store.list_letters().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_letter_with_unknown_pigeon_fails_and_writes_nothing() {
  let f = fixture().await;

  let err = f
    .service
    .create(letter(f.sender, Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::PigeonNotFound(_)));
  assert!(f.store.list_letters().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_letter_with_retired_pigeon_fails_and_writes_nothing() {
  let f = fixture().await;

  let err = f
    .service
    .create(letter(f.sender, f.retired))
    .await
    .unwrap_err();
  assert!(
    matches!(err, loft_core::Error::PigeonRetired { ref nickname, .. } if nickname == "Thunder")
  );
  assert!(err.to_string().contains("Thunder"));
  assert!(f.store.list_letters().await.unwrap().is_empty());
}

#[tokio::test]
async fn full_delivery_chain_then_terminal_conflict() {
  let f = fixture().await;
  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  let id = created.letter.id;

  let sent = f
    .service
    .update_status(id, LetterStatus::Sent)
    .await
    .unwrap();
  assert_eq!(sent.letter.status, LetterStatus::Sent);

  let delivered = f
    .service
    .update_status(id, LetterStatus::Delivered)
    .await
    .unwrap();
  assert_eq!(delivered.letter.status, LetterStatus::Delivered);

  // Any further mutation is a conflict, and the row is untouched.
  let err = f
    .service
    .update_status(id, LetterStatus::Sent)
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::DeliveredImmutable(_)));
  assert_eq!(
    f.store.get_letter(id).await.unwrap().unwrap().status,
    LetterStatus::Delivered
  );
}

#[tokio::test]
async fn delivered_to_delivered_is_still_a_conflict() {
  let f = fixture().await;
  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  let id = created.letter.id;

  f.service.update_status(id, LetterStatus::Sent).await.unwrap();
  f.service
    .update_status(id, LetterStatus::Delivered)
    .await
    .unwrap();

  // Not idempotent by design: repeating the terminal transition errors.
  let err = f
    .service
    .update_status(id, LetterStatus::Delivered)
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::DeliveredImmutable(_)));
}

#[tokio::test]
async fn skipping_a_step_is_an_invalid_transition() {
  let f = fixture().await;
  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  let id = created.letter.id;

  let err = f
    .service
    .update_status(id, LetterStatus::Delivered)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    loft_core::Error::InvalidTransition {
      from: LetterStatus::Queued,
      to:   LetterStatus::Delivered,
    }
  ));
  assert!(err.to_string().contains("QUEUED -> SENT -> DELIVERED"));
  assert_eq!(
    f.store.get_letter(id).await.unwrap().unwrap().status,
    LetterStatus::Queued
  );
}

#[tokio::test]
async fn moving_backward_is_an_invalid_transition() {
  let f = fixture().await;
  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  let id = created.letter.id;
  f.service.update_status(id, LetterStatus::Sent).await.unwrap();

  let err = f
    .service
    .update_status(id, LetterStatus::Queued)
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn update_status_of_unknown_letter_is_not_found() {
  let f = fixture().await;
  let err = f
    .service
    .update_status(Uuid::new_v4(), LetterStatus::Sent)
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::LetterNotFound(_)));
}

#[tokio::test]
async fn find_by_status_filters_exactly_and_orders_newest_first() {
  let f = fixture().await;

  let queued_old = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let sent = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let queued_new = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();

  f.service
    .update_status(sent.letter.id, LetterStatus::Sent)
    .await
    .unwrap();

  let queued = f.service.find_by_status(LetterStatus::Queued).await.unwrap();
  assert_eq!(queued.len(), 2);
  assert_eq!(queued[0].letter.id, queued_new.letter.id);
  assert_eq!(queued[1].letter.id, queued_old.letter.id);
  assert!(queued.iter().all(|l| l.letter.status == LetterStatus::Queued));

  let delivered = f
    .service
    .find_by_status(LetterStatus::Delivered)
    .await
    .unwrap();
  assert!(delivered.is_empty());
}

// ─── The guard when a concurrent writer wins ─────────────────────────────────

/// A store whose conditional status write always reports that another writer
/// advanced the letter first. Only the two methods the status-update path
/// touches are reachable.
#[derive(Clone)]
struct ContestedStore {
  letter: Letter,
}

impl DeliveryStore for ContestedStore {
  type Error = loft_core::Error;

  async fn get_letter(
    &self,
    _id: Uuid,
  ) -> Result<Option<Letter>, Self::Error> {
    Ok(Some(self.letter.clone()))
  }

  async fn update_letter_status(
    &self,
    _id: Uuid,
    _expected: LetterStatus,
    _new_status: LetterStatus,
  ) -> Result<Option<LetterWithRefs>, Self::Error> {
    Ok(None)
  }

  async fn add_pigeon(
    &self,
    _input: NewPigeon,
  ) -> Result<Pigeon, Self::Error> {
    unreachable!()
  }

  async fn get_pigeon(
    &self,
    _id: Uuid,
  ) -> Result<Option<Pigeon>, Self::Error> {
    unreachable!()
  }

  async fn get_pigeon_detail(
    &self,
    _id: Uuid,
  ) -> Result<Option<PigeonDetail>, Self::Error> {
    unreachable!()
  }

  async fn list_pigeons(
    &self,
    _include_retired: bool,
  ) -> Result<Vec<Pigeon>, Self::Error> {
    unreachable!()
  }

  async fn update_pigeon(
    &self,
    _id: Uuid,
    _changes: PigeonUpdate,
  ) -> Result<Option<Pigeon>, Self::Error> {
    unreachable!()
  }

  async fn retire_pigeon(
    &self,
    _id: Uuid,
  ) -> Result<Option<Pigeon>, Self::Error> {
    unreachable!()
  }

  async fn add_customer(
    &self,
    _input: NewCustomer,
  ) -> Result<Customer, Self::Error> {
    unreachable!()
  }

  async fn get_customer(
    &self,
    _id: Uuid,
  ) -> Result<Option<Customer>, Self::Error> {
    unreachable!()
  }

  async fn get_customer_detail(
    &self,
    _id: Uuid,
  ) -> Result<Option<CustomerDetail>, Self::Error> {
    unreachable!()
  }

  async fn list_customers(
    &self,
  ) -> Result<Vec<CustomerWithCount>, Self::Error> {
    unreachable!()
  }

  async fn update_customer(
    &self,
    _id: Uuid,
    _changes: CustomerUpdate,
  ) -> Result<Option<Customer>, Self::Error> {
    unreachable!()
  }

  async fn count_letters_for_sender(
    &self,
    _id: Uuid,
  ) -> Result<u64, Self::Error> {
    unreachable!()
  }

  async fn delete_customer(&self, _id: Uuid) -> Result<bool, Self::Error> {
    unreachable!()
  }

  async fn insert_letter(
    &self,
    _input: NewLetter,
  ) -> Result<Letter, Self::Error> {
    unreachable!()
  }

  async fn get_letter_with_parties(
    &self,
    _id: Uuid,
  ) -> Result<Option<LetterWithParties>, Self::Error> {
    unreachable!()
  }

  async fn list_letters(
    &self,
  ) -> Result<Vec<LetterWithParties>, Self::Error> {
    unreachable!()
  }

  async fn list_letters_by_status(
    &self,
    _status: LetterStatus,
  ) -> Result<Vec<LetterWithRefs>, Self::Error> {
    unreachable!()
  }
}

#[tokio::test]
async fn losing_the_status_write_race_is_a_conflict() {
  let now = Utc::now();
  let queued = Letter {
    id:                Uuid::new_v4(),
    content:           "Hello from the loft".into(),
    recipient_name:    "Maria Oliveira".into(),
    recipient_address: "Rua das Palmeiras, 789".into(),
    status:            LetterStatus::Queued,
    sender_id:         Uuid::new_v4(),
    pigeon_id:         Uuid::new_v4(),
    created_at:        now,
    updated_at:        now,
  };
  let id = queued.id;
  let service = LetterService::new(Arc::new(ContestedStore { letter: queued }));

  // The read sees QUEUED and SENT is a valid next step, so the guard gets
  // all the way to the conditional write; losing it is a distinct conflict,
  // not a silent re-apply and not an invalid transition.
  let err = service
    .update_status(id, LetterStatus::Sent)
    .await
    .unwrap_err();
  assert!(matches!(err, loft_core::Error::StatusRaced(raced) if raced == id));
}

#[tokio::test]
async fn pigeon_detail_keeps_letters_after_retirement() {
  let f = fixture().await;
  let created = f
    .service
    .create(letter(f.sender, f.active))
    .await
    .unwrap();

  // A pigeon retired mid-flight keeps its already-assigned letters.
  f.store.retire_pigeon(f.active).await.unwrap();

  let detail = f.store.get_pigeon_detail(f.active).await.unwrap().unwrap();
  assert!(!detail.pigeon.is_active);
  assert_eq!(detail.letters.len(), 1);
  assert_eq!(detail.letters[0].letter.id, created.letter.id);
  assert_eq!(detail.letters[0].sender.name, "João Silva");
}
