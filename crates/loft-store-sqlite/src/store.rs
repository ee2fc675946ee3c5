//! [`SqliteStore`] — the SQLite implementation of [`DeliveryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use loft_core::{
  customer::{
    Customer, CustomerDetail, CustomerUpdate, CustomerWithCount, NewCustomer,
  },
  letter::{Letter, LetterStatus, LetterWithParties, LetterWithRefs, NewLetter},
  pigeon::{NewPigeon, Pigeon, PigeonDetail, PigeonUpdate},
  store::DeliveryStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCustomer, RawLetter, RawLetterJoin, RawPigeon, encode_date, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Shared query fragments ──────────────────────────────────────────────────

const PIGEON_COLS: &str =
  "pigeon_id, nickname, photo_url, average_speed, is_active, created_at, \
   updated_at";

const CUSTOMER_COLS: &str =
  "customer_id, name, email, birth_date, address, created_at, updated_at";

/// Every letter read joins both parties; the projections differ only in how
/// much of the joined row they keep.
const LETTER_JOIN: &str = "SELECT
     l.letter_id, l.content, l.recipient_name, l.recipient_address,
     l.status, l.sender_id, l.pigeon_id, l.created_at, l.updated_at,
     c.name, c.email,
     p.nickname, p.average_speed, p.is_active
   FROM letters l
   JOIN customers c ON c.customer_id = l.sender_id
   JOIN pigeons   p ON p.pigeon_id   = l.pigeon_id";

fn pigeon_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPigeon> {
  Ok(RawPigeon {
    pigeon_id:     row.get(0)?,
    nickname:      row.get(1)?,
    photo_url:     row.get(2)?,
    average_speed: row.get(3)?,
    is_active:     row.get(4)?,
    created_at:    row.get(5)?,
    updated_at:    row.get(6)?,
  })
}

fn customer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCustomer> {
  Ok(RawCustomer {
    customer_id: row.get(0)?,
    name:        row.get(1)?,
    email:       row.get(2)?,
    birth_date:  row.get(3)?,
    address:     row.get(4)?,
    created_at:  row.get(5)?,
    updated_at:  row.get(6)?,
  })
}

fn letter_join_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLetterJoin> {
  Ok(RawLetterJoin {
    letter:          RawLetter {
      letter_id:         row.get(0)?,
      content:           row.get(1)?,
      recipient_name:    row.get(2)?,
      recipient_address: row.get(3)?,
      status:            row.get(4)?,
      sender_id:         row.get(5)?,
      pigeon_id:         row.get(6)?,
      created_at:        row.get(7)?,
      updated_at:        row.get(8)?,
    },
    sender_name:     row.get(9)?,
    sender_email:    row.get(10)?,
    pigeon_nickname: row.get(11)?,
    pigeon_speed:    row.get(12)?,
    pigeon_active:   row.get(13)?,
  })
}

/// Whether `e` is a UNIQUE violation mentioning `column`
/// (e.g. `"customers.email"`).
fn unique_violation(e: &tokio_rusqlite::Error, column: &str) -> bool {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      f,
      Some(msg),
    )) => {
      f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        && msg.contains(column)
    }
    _ => false,
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Loft delivery store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch the joined letter row for `id`, if any.
  async fn get_letter_join(&self, id: Uuid) -> Result<Option<RawLetterJoin>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawLetterJoin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{LETTER_JOIN} WHERE l.letter_id = ?1"),
              rusqlite::params![id_str],
              letter_join_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// All joined letter rows matching a single-column filter, newest first.
  async fn list_letter_joins(
    &self,
    where_clause: &'static str,
    param: Option<String>,
  ) -> Result<Vec<RawLetterJoin>> {
    let raws: Vec<RawLetterJoin> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{LETTER_JOIN} {where_clause} ORDER BY l.created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = if let Some(p) = param {
          stmt
            .query_map(rusqlite::params![p], letter_join_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          stmt
            .query_map([], letter_join_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }

  /// Write a full pigeon row back; used by the read-modify-write update.
  async fn write_pigeon(&self, pigeon: &Pigeon) -> Result<()> {
    let id_str      = encode_uuid(pigeon.id);
    let nickname    = pigeon.nickname.clone();
    let photo_url   = pigeon.photo_url.clone();
    let speed       = pigeon.average_speed;
    let updated_str = encode_dt(pigeon.updated_at);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE pigeons
           SET nickname = ?1, photo_url = ?2, average_speed = ?3,
               updated_at = ?4
           WHERE pigeon_id = ?5",
          rusqlite::params![nickname, photo_url, speed, updated_str, id_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(()),
      Err(e) if unique_violation(&e, "pigeons.nickname") => {
        Err(Error::DuplicateNickname(pigeon.nickname.clone()))
      }
      Err(e) => Err(e.into()),
    }
  }

  /// Write a full customer row back; used by the read-modify-write update.
  async fn write_customer(&self, customer: &Customer) -> Result<()> {
    let id_str      = encode_uuid(customer.id);
    let name        = customer.name.clone();
    let email       = customer.email.clone();
    let birth_str   = encode_date(customer.birth_date);
    let address     = customer.address.clone();
    let updated_str = encode_dt(customer.updated_at);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE customers
           SET name = ?1, email = ?2, birth_date = ?3, address = ?4,
               updated_at = ?5
           WHERE customer_id = ?6",
          rusqlite::params![name, email, birth_str, address, updated_str, id_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(()),
      Err(e) if unique_violation(&e, "customers.email") => {
        Err(Error::DuplicateEmail(customer.email.clone()))
      }
      Err(e) => Err(e.into()),
    }
  }
}

// ─── DeliveryStore impl ──────────────────────────────────────────────────────

impl DeliveryStore for SqliteStore {
  type Error = Error;

  // ── Pigeons ───────────────────────────────────────────────────────────────

  async fn add_pigeon(&self, input: NewPigeon) -> Result<Pigeon> {
    let now = Utc::now();
    let pigeon = Pigeon {
      id:            Uuid::new_v4(),
      nickname:      input.nickname,
      photo_url:     input.photo_url,
      average_speed: input.average_speed,
      is_active:     true,
      created_at:    now,
      updated_at:    now,
    };

    let id_str    = encode_uuid(pigeon.id);
    let nickname  = pigeon.nickname.clone();
    let photo_url = pigeon.photo_url.clone();
    let speed     = pigeon.average_speed;
    let at_str    = encode_dt(now);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pigeons (
             pigeon_id, nickname, photo_url, average_speed, is_active,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
          rusqlite::params![id_str, nickname, photo_url, speed, at_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(pigeon),
      Err(e) if unique_violation(&e, "pigeons.nickname") => {
        Err(Error::DuplicateNickname(pigeon.nickname))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_pigeon(&self, id: Uuid) -> Result<Option<Pigeon>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPigeon> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PIGEON_COLS} FROM pigeons WHERE pigeon_id = ?1"),
              rusqlite::params![id_str],
              pigeon_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPigeon::into_pigeon).transpose()
  }

  async fn get_pigeon_detail(&self, id: Uuid) -> Result<Option<PigeonDetail>> {
    let pigeon = match self.get_pigeon(id).await? {
      Some(p) => p,
      None => return Ok(None),
    };

    let raws = self
      .list_letter_joins("WHERE l.pigeon_id = ?1", Some(encode_uuid(id)))
      .await?;
    let letters = raws
      .into_iter()
      .map(RawLetterJoin::into_pigeon_letter)
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(PigeonDetail { pigeon, letters }))
  }

  async fn list_pigeons(&self, include_retired: bool) -> Result<Vec<Pigeon>> {
    let raws: Vec<RawPigeon> = self
      .conn
      .call(move |conn| {
        let sql = if include_retired {
          format!("SELECT {PIGEON_COLS} FROM pigeons ORDER BY created_at DESC")
        } else {
          format!(
            "SELECT {PIGEON_COLS} FROM pigeons WHERE is_active = 1
             ORDER BY created_at DESC"
          )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], pigeon_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPigeon::into_pigeon).collect()
  }

  async fn update_pigeon(
    &self,
    id: Uuid,
    changes: PigeonUpdate,
  ) -> Result<Option<Pigeon>> {
    let mut pigeon = match self.get_pigeon(id).await? {
      Some(p) => p,
      None => return Ok(None),
    };

    if let Some(nickname) = changes.nickname {
      pigeon.nickname = nickname;
    }
    if let Some(photo_url) = changes.photo_url {
      pigeon.photo_url = Some(photo_url);
    }
    if let Some(speed) = changes.average_speed {
      pigeon.average_speed = speed;
    }
    pigeon.updated_at = Utc::now();

    self.write_pigeon(&pigeon).await?;
    Ok(Some(pigeon))
  }

  async fn retire_pigeon(&self, id: Uuid) -> Result<Option<Pigeon>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE pigeons SET is_active = 0, updated_at = ?1
           WHERE pigeon_id = ?2",
          rusqlite::params![at_str, id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Ok(None);
    }
    self.get_pigeon(id).await
  }

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn add_customer(&self, input: NewCustomer) -> Result<Customer> {
    let now = Utc::now();
    let customer = Customer {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      birth_date: input.birth_date,
      address:    input.address,
      created_at: now,
      updated_at: now,
    };

    let id_str    = encode_uuid(customer.id);
    let name      = customer.name.clone();
    let email     = customer.email.clone();
    let birth_str = encode_date(customer.birth_date);
    let address   = customer.address.clone();
    let at_str    = encode_dt(now);

    let res = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (
             customer_id, name, email, birth_date, address,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, name, email, birth_str, address, at_str],
        )?;
        Ok(())
      })
      .await;

    match res {
      Ok(()) => Ok(customer),
      Err(e) if unique_violation(&e, "customers.email") => {
        Err(Error::DuplicateEmail(customer.email))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CUSTOMER_COLS} FROM customers WHERE customer_id = ?1"
              ),
              rusqlite::params![id_str],
              customer_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn get_customer_detail(
    &self,
    id: Uuid,
  ) -> Result<Option<CustomerDetail>> {
    let customer = match self.get_customer(id).await? {
      Some(c) => c,
      None => return Ok(None),
    };

    let raws = self
      .list_letter_joins("WHERE l.sender_id = ?1", Some(encode_uuid(id)))
      .await?;
    let letters = raws
      .into_iter()
      .map(RawLetterJoin::into_customer_letter)
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(CustomerDetail { customer, letters }))
  }

  async fn list_customers(&self) -> Result<Vec<CustomerWithCount>> {
    let rows: Vec<(RawCustomer, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.customer_id, c.name, c.email, c.birth_date, c.address,
                  c.created_at, c.updated_at,
                  COUNT(l.letter_id)
           FROM customers c
           LEFT JOIN letters l ON l.sender_id = c.customer_id
           GROUP BY c.customer_id
           ORDER BY c.name ASC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((customer_row(row)?, row.get(7)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(raw, count)| {
        Ok(CustomerWithCount {
          customer:     raw.into_customer()?,
          letter_count: count as u64,
        })
      })
      .collect()
  }

  async fn update_customer(
    &self,
    id: Uuid,
    changes: CustomerUpdate,
  ) -> Result<Option<Customer>> {
    let mut customer = match self.get_customer(id).await? {
      Some(c) => c,
      None => return Ok(None),
    };

    if let Some(name) = changes.name {
      customer.name = name;
    }
    if let Some(email) = changes.email {
      customer.email = email;
    }
    if let Some(birth_date) = changes.birth_date {
      customer.birth_date = birth_date;
    }
    if let Some(address) = changes.address {
      customer.address = address;
    }
    customer.updated_at = Utc::now();

    self.write_customer(&customer).await?;
    Ok(Some(customer))
  }

  async fn count_letters_for_sender(&self, id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(id);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM letters WHERE sender_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn delete_customer(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM customers WHERE customer_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Letters ───────────────────────────────────────────────────────────────

  async fn insert_letter(&self, input: NewLetter) -> Result<Letter> {
    let now = Utc::now();
    // Status is fixed here; the input shape carries none.
    let letter = Letter {
      id:                Uuid::new_v4(),
      content:           input.content,
      recipient_name:    input.recipient_name,
      recipient_address: input.recipient_address,
      status:            LetterStatus::Queued,
      sender_id:         input.sender_id,
      pigeon_id:         input.pigeon_id,
      created_at:        now,
      updated_at:        now,
    };

    let id_str     = encode_uuid(letter.id);
    let content    = letter.content.clone();
    let rcpt_name  = letter.recipient_name.clone();
    let rcpt_addr  = letter.recipient_address.clone();
    let status_str = encode_status(letter.status).to_owned();
    let sender_str = encode_uuid(letter.sender_id);
    let pigeon_str = encode_uuid(letter.pigeon_id);
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO letters (
             letter_id, content, recipient_name, recipient_address,
             status, sender_id, pigeon_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            id_str, content, rcpt_name, rcpt_addr, status_str, sender_str,
            pigeon_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(letter)
  }

  async fn get_letter(&self, id: Uuid) -> Result<Option<Letter>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLetter> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT letter_id, content, recipient_name, recipient_address,
                      status, sender_id, pigeon_id, created_at, updated_at
               FROM letters WHERE letter_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawLetter {
                  letter_id:         row.get(0)?,
                  content:           row.get(1)?,
                  recipient_name:    row.get(2)?,
                  recipient_address: row.get(3)?,
                  status:            row.get(4)?,
                  sender_id:         row.get(5)?,
                  pigeon_id:         row.get(6)?,
                  created_at:        row.get(7)?,
                  updated_at:        row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLetter::into_letter).transpose()
  }

  async fn get_letter_with_parties(
    &self,
    id: Uuid,
  ) -> Result<Option<LetterWithParties>> {
    self
      .get_letter_join(id)
      .await?
      .map(RawLetterJoin::into_with_parties)
      .transpose()
  }

  async fn list_letters(&self) -> Result<Vec<LetterWithParties>> {
    let raws = self.list_letter_joins("", None).await?;
    raws
      .into_iter()
      .map(RawLetterJoin::into_with_parties)
      .collect()
  }

  async fn list_letters_by_status(
    &self,
    status: LetterStatus,
  ) -> Result<Vec<LetterWithRefs>> {
    let raws = self
      .list_letter_joins(
        "WHERE l.status = ?1",
        Some(encode_status(status).to_owned()),
      )
      .await?;
    raws.into_iter().map(RawLetterJoin::into_with_refs).collect()
  }

  async fn update_letter_status(
    &self,
    id: Uuid,
    expected: LetterStatus,
    new_status: LetterStatus,
  ) -> Result<Option<LetterWithRefs>> {
    let id_str   = encode_uuid(id);
    let exp_str  = encode_status(expected).to_owned();
    let new_str  = encode_status(new_status).to_owned();
    let at_str   = encode_dt(Utc::now());

    // Compare-and-swap: the write lands only if nobody moved the status
    // since the caller read it.
    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE letters SET status = ?1, updated_at = ?2
           WHERE letter_id = ?3 AND status = ?4",
          rusqlite::params![new_str, at_str, id_str, exp_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Ok(None);
    }

    self
      .get_letter_join(id)
      .await?
      .map(RawLetterJoin::into_with_refs)
      .transpose()
  }
}
