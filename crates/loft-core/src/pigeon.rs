//! Pigeon — the courier entity.
//!
//! Pigeons are created active and leave service only through the explicit
//! retire operation. Retirement is permanent and pigeons are never deleted;
//! letters already assigned to a retired pigeon keep their assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{customer::SenderSummary, letter::Letter};

/// A courier. `nickname` is unique across the loft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pigeon {
  pub id:            Uuid,
  pub nickname:      String,
  pub photo_url:     Option<String>,
  /// Cruise speed in km/h; strictly positive.
  pub average_speed: f64,
  pub is_active:     bool,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Compact projection attached to letter reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PigeonSummary {
  pub id:            Uuid,
  pub nickname:      String,
  pub average_speed: f64,
  pub is_active:     bool,
}

impl From<&Pigeon> for PigeonSummary {
  fn from(p: &Pigeon) -> Self {
    Self {
      id:            p.id,
      nickname:      p.nickname.clone(),
      average_speed: p.average_speed,
      is_active:     p.is_active,
    }
  }
}

/// Input to pigeon creation. `is_active` is not accepted: new pigeons are
/// always active.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPigeon {
  pub nickname:      String,
  pub photo_url:     Option<String>,
  pub average_speed: f64,
}

/// Partial update; `None` fields are left unchanged. There is no way to flip
/// `is_active` here — retirement has its own operation and is one-way.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PigeonUpdate {
  pub nickname:      Option<String>,
  pub photo_url:     Option<String>,
  pub average_speed: Option<f64>,
}

impl PigeonUpdate {
  pub fn is_empty(&self) -> bool {
    self.nickname.is_none()
      && self.photo_url.is_none()
      && self.average_speed.is_none()
  }
}

/// A pigeon with its assigned letters, newest first. Detail read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PigeonDetail {
  #[serde(flatten)]
  pub pigeon:  Pigeon,
  pub letters: Vec<PigeonLetter>,
}

/// A letter as seen from its carrier's detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PigeonLetter {
  #[serde(flatten)]
  pub letter: Letter,
  pub sender: SenderSummary,
}
