//! Customer — the party who originates letters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{letter::Letter, pigeon::PigeonSummary};

/// A sender. `email` is unique; violation surfaces as a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  /// Calendar date only — no time-of-day component.
  pub birth_date: NaiveDate,
  pub address:    String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Compact projection attached to letter reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderSummary {
  pub id:    Uuid,
  pub name:  String,
  pub email: String,
}

impl From<&Customer> for SenderSummary {
  fn from(c: &Customer) -> Self {
    Self {
      id:    c.id,
      name:  c.name.clone(),
      email: c.email.clone(),
    }
  }
}

/// Input to customer creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCustomer {
  pub name:       String,
  pub email:      String,
  pub birth_date: NaiveDate,
  pub address:    String,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerUpdate {
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub birth_date: Option<NaiveDate>,
  pub address:    Option<String>,
}

impl CustomerUpdate {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.email.is_none()
      && self.birth_date.is_none()
      && self.address.is_none()
  }
}

/// List row: a customer plus how many letters they have sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithCount {
  #[serde(flatten)]
  pub customer:     Customer,
  pub letter_count: u64,
}

/// A customer with their sent letters, newest first. Detail read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
  #[serde(flatten)]
  pub customer: Customer,
  pub letters:  Vec<CustomerLetter>,
}

/// A letter as seen from its sender's detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLetter {
  #[serde(flatten)]
  pub letter: Letter,
  pub pigeon: PigeonSummary,
}
