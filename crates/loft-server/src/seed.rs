//! Demo fixtures for an empty store.
//!
//! Letters are created and advanced through [`LetterService`] rather than
//! written directly, so seeded data went through the same guard as live
//! traffic.

use std::sync::Arc;

use anyhow::{Context as _, bail};
use chrono::NaiveDate;
use loft_core::{
  customer::{Customer, NewCustomer},
  letter::{LetterStatus, NewLetter},
  lifecycle::LetterService,
  pigeon::NewPigeon,
  store::DeliveryStore,
};
use loft_store_sqlite::SqliteStore;
use uuid::Uuid;

pub async fn seed(store: &SqliteStore) -> anyhow::Result<()> {
  let empty = store.list_pigeons(true).await?.is_empty()
    && store.list_customers().await?.is_empty()
    && store.list_letters().await?.is_empty();
  if !empty {
    bail!("refusing to seed a non-empty store");
  }

  tracing::info!("seeding demo fixtures");

  let flash = store
    .add_pigeon(NewPigeon {
      nickname:      "Flash".into(),
      photo_url:     Some("https://example.com/flash.jpg".into()),
      average_speed: 85.5,
    })
    .await?;
  let sonic = store
    .add_pigeon(NewPigeon {
      nickname:      "Sonic".into(),
      photo_url:     Some("https://example.com/sonic.jpg".into()),
      average_speed: 92.0,
    })
    .await?;
  let thunder = store
    .add_pigeon(NewPigeon {
      nickname:      "Thunder".into(),
      photo_url:     Some("https://example.com/thunder.jpg".into()),
      average_speed: 78.3,
    })
    .await?;
  store.retire_pigeon(thunder.id).await?;

  let joao = customer(
    store,
    "João Silva",
    "joao.silva@email.com",
    (1990, 5, 15),
    "Rua das Flores, 123 - São Paulo, SP",
  )
  .await?;
  let maria = customer(
    store,
    "Maria Santos",
    "maria.santos@email.com",
    (1985, 8, 22),
    "Avenida Central, 456 - Rio de Janeiro, RJ",
  )
  .await?;

  let service = LetterService::new(Arc::new(store.clone()));

  // Five letters: two delivered, one in flight, two queued.
  let delivered_1 = letter(
    &service,
    "Olá Maria! Como você está? Espero que esteja tudo bem por aí.",
    "Maria Oliveira",
    "Rua das Palmeiras, 789 - Belo Horizonte, MG",
    joao.id,
    flash.id,
  )
  .await?;
  advance(&service, delivered_1, LetterStatus::Delivered).await?;

  let in_flight = letter(
    &service,
    "Prezado Sr. Carlos, segue em anexo as informações solicitadas.",
    "Carlos Ferreira",
    "Praça da Liberdade, 321 - Salvador, BA",
    maria.id,
    sonic.id,
  )
  .await?;
  advance(&service, in_flight, LetterStatus::Sent).await?;

  letter(
    &service,
    "Convite para festa de aniversário na próxima semana!",
    "Ana Costa",
    "Rua do Sol, 654 - Recife, PE",
    joao.id,
    flash.id,
  )
  .await?;

  let delivered_2 = letter(
    &service,
    "Relatório mensal de vendas conforme solicitado.",
    "Pedro Lima",
    "Avenida Paulista, 987 - São Paulo, SP",
    maria.id,
    sonic.id,
  )
  .await?;
  advance(&service, delivered_2, LetterStatus::Delivered).await?;

  letter(
    &service,
    "Obrigado pelo excelente atendimento na última visita.",
    "Roberto Souza",
    "Rua da Praia, 147 - Florianópolis, SC",
    joao.id,
    flash.id,
  )
  .await?;

  tracing::info!(
    "seeded 3 pigeons (1 retired), 2 customers, 5 letters across all statuses"
  );
  Ok(())
}

async fn customer(
  store: &SqliteStore,
  name: &str,
  email: &str,
  (y, m, d): (i32, u32, u32),
  address: &str,
) -> anyhow::Result<Customer> {
  let birth_date =
    NaiveDate::from_ymd_opt(y, m, d).context("invalid fixture birth date")?;
  Ok(
    store
      .add_customer(NewCustomer {
        name: name.into(),
        email: email.into(),
        birth_date,
        address: address.into(),
      })
      .await?,
  )
}

async fn letter(
  service: &LetterService<SqliteStore>,
  content: &str,
  recipient_name: &str,
  recipient_address: &str,
  sender_id: Uuid,
  pigeon_id: Uuid,
) -> anyhow::Result<Uuid> {
  let created = service
    .create(NewLetter {
      content:           content.into(),
      recipient_name:    recipient_name.into(),
      recipient_address: recipient_address.into(),
      sender_id,
      pigeon_id,
    })
    .await?;
  Ok(created.letter.id)
}

/// Walk a letter forward one step at a time until it reaches `target`.
async fn advance(
  service: &LetterService<SqliteStore>,
  id: Uuid,
  target: LetterStatus,
) -> anyhow::Result<()> {
  let mut status = LetterStatus::Queued;
  while status != target {
    let next = status.next().context("target status unreachable")?;
    service.update_status(id, next).await?;
    status = next;
  }
  Ok(())
}
