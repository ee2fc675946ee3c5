//! Letter — a delivery job carried by a pigeon on behalf of a customer.
//!
//! A letter's content and recipient fields are frozen at creation; the only
//! mutable field is `status`, and only through the lifecycle guard in
//! [`crate::lifecycle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{customer::SenderSummary, pigeon::PigeonSummary};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Delivery status. Ordered and one-directional: a letter only ever moves
/// `Queued -> Sent -> Delivered`, one step at a time. `Delivered` is terminal.
///
/// The wire and database representation is the uppercase name
/// (`"QUEUED"` / `"SENT"` / `"DELIVERED"`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterStatus {
  Queued,
  Sent,
  Delivered,
}

impl LetterStatus {
  /// The single status this one may advance to, if any.
  pub fn next(self) -> Option<LetterStatus> {
    match self {
      Self::Queued => Some(Self::Sent),
      Self::Sent => Some(Self::Delivered),
      Self::Delivered => None,
    }
  }

  /// Whether `target` is the one allowed forward step from `self`.
  pub fn can_advance_to(self, target: LetterStatus) -> bool {
    self.next() == Some(target)
  }

  /// `Delivered` is terminal: no transition leaves it.
  pub fn is_terminal(self) -> bool { matches!(self, Self::Delivered) }
}

// ─── Letter ──────────────────────────────────────────────────────────────────

/// A persisted delivery job. `sender_id` and `pigeon_id` are plain foreign
/// keys, not ownership — deleting or retiring the referenced party never
/// cascades into letters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
  pub id:                Uuid,
  pub content:           String,
  pub recipient_name:    String,
  pub recipient_address: String,
  pub status:            LetterStatus,
  pub sender_id:         Uuid,
  pub pigeon_id:         Uuid,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Input to letter creation. Deliberately has no status field: every letter
/// starts `Queued` and callers cannot say otherwise. Unknown JSON fields
/// (including `status`) are rejected at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewLetter {
  pub content:           String,
  pub recipient_name:    String,
  pub recipient_address: String,
  pub sender_id:         Uuid,
  pub pigeon_id:         Uuid,
}

// ─── Read views ──────────────────────────────────────────────────────────────

/// Minimal identity of a letter's sender or carrier, used where the full
/// summary would be overkill (status updates, status-filtered listings).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
  pub id:   Uuid,
  pub name: String,
}

/// A letter joined with display-ready summaries of both parties. This is a
/// read convenience computed at query time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterWithParties {
  #[serde(flatten)]
  pub letter: Letter,
  pub sender: SenderSummary,
  pub pigeon: PigeonSummary,
}

/// A letter joined with bare id + name references for both parties — the
/// smaller projection returned by status updates and status filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterWithRefs {
  #[serde(flatten)]
  pub letter: Letter,
  pub sender: PartyRef,
  pub pigeon: PartyRef,
}
