//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, birth dates as bare ISO 8601
//! calendar dates, statuses as their uppercase wire names, and UUIDs as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use loft_core::{
  customer::{Customer, CustomerLetter, SenderSummary},
  letter::{
    Letter, LetterStatus, LetterWithParties, LetterWithRefs, PartyRef,
  },
  pigeon::{Pigeon, PigeonLetter, PigeonSummary},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LetterStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: LetterStatus) -> &'static str {
  match s {
    LetterStatus::Queued => "QUEUED",
    LetterStatus::Sent => "SENT",
    LetterStatus::Delivered => "DELIVERED",
  }
}

pub fn decode_status(s: &str) -> Result<LetterStatus> {
  match s {
    "QUEUED" => Ok(LetterStatus::Queued),
    "SENT" => Ok(LetterStatus::Sent),
    "DELIVERED" => Ok(LetterStatus::Delivered),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `pigeons` row.
pub struct RawPigeon {
  pub pigeon_id:     String,
  pub nickname:      String,
  pub photo_url:     Option<String>,
  pub average_speed: f64,
  pub is_active:     bool,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawPigeon {
  pub fn into_pigeon(self) -> Result<Pigeon> {
    Ok(Pigeon {
      id:            decode_uuid(&self.pigeon_id)?,
      nickname:      self.nickname,
      photo_url:     self.photo_url,
      average_speed: self.average_speed,
      is_active:     self.is_active,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `customers` row.
pub struct RawCustomer {
  pub customer_id: String,
  pub name:        String,
  pub email:       String,
  pub birth_date:  String,
  pub address:     String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawCustomer {
  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      id:         decode_uuid(&self.customer_id)?,
      name:       self.name,
      email:      self.email,
      birth_date: decode_date(&self.birth_date)?,
      address:    self.address,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `letters` row.
pub struct RawLetter {
  pub letter_id:         String,
  pub content:           String,
  pub recipient_name:    String,
  pub recipient_address: String,
  pub status:            String,
  pub sender_id:         String,
  pub pigeon_id:         String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawLetter {
  pub fn into_letter(self) -> Result<Letter> {
    Ok(Letter {
      id:                decode_uuid(&self.letter_id)?,
      content:           self.content,
      recipient_name:    self.recipient_name,
      recipient_address: self.recipient_address,
      status:            decode_status(&self.status)?,
      sender_id:         decode_uuid(&self.sender_id)?,
      pigeon_id:         decode_uuid(&self.pigeon_id)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// A `letters` row joined with the columns needed to build either party
/// projection. Every letter read joins both parties, so one row shape covers
/// all the view types.
pub struct RawLetterJoin {
  pub letter:          RawLetter,
  pub sender_name:     String,
  pub sender_email:    String,
  pub pigeon_nickname: String,
  pub pigeon_speed:    f64,
  pub pigeon_active:   bool,
}

impl RawLetterJoin {
  pub fn into_with_parties(self) -> Result<LetterWithParties> {
    let letter = self.letter.into_letter()?;
    let sender = SenderSummary {
      id:    letter.sender_id,
      name:  self.sender_name,
      email: self.sender_email,
    };
    let pigeon = PigeonSummary {
      id:            letter.pigeon_id,
      nickname:      self.pigeon_nickname,
      average_speed: self.pigeon_speed,
      is_active:     self.pigeon_active,
    };
    Ok(LetterWithParties {
      letter,
      sender,
      pigeon,
    })
  }

  /// Letter + sender summary, as shown on a pigeon's detail view.
  pub fn into_pigeon_letter(self) -> Result<PigeonLetter> {
    let letter = self.letter.into_letter()?;
    let sender = SenderSummary {
      id:    letter.sender_id,
      name:  self.sender_name,
      email: self.sender_email,
    };
    Ok(PigeonLetter { letter, sender })
  }

  /// Letter + pigeon summary, as shown on a customer's detail view.
  pub fn into_customer_letter(self) -> Result<CustomerLetter> {
    let letter = self.letter.into_letter()?;
    let pigeon = PigeonSummary {
      id:            letter.pigeon_id,
      nickname:      self.pigeon_nickname,
      average_speed: self.pigeon_speed,
      is_active:     self.pigeon_active,
    };
    Ok(CustomerLetter { letter, pigeon })
  }

  pub fn into_with_refs(self) -> Result<LetterWithRefs> {
    let letter = self.letter.into_letter()?;
    let sender = PartyRef {
      id:   letter.sender_id,
      name: self.sender_name,
    };
    let pigeon = PartyRef {
      id:   letter.pigeon_id,
      name: self.pigeon_nickname,
    };
    Ok(LetterWithRefs {
      letter,
      sender,
      pigeon,
    })
  }
}
