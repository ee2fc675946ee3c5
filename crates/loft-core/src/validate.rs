//! Field-level validation for input shapes.
//!
//! One standalone function per input type, returning a structured list of
//! field errors. Handlers run these before the guard or store is touched; an
//! empty list means the input may proceed. These checks are shape checks
//! only — cross-entity rules (sender exists, pigeon active, …) belong to the
//! lifecycle guard.

use serde::Serialize;

use crate::{
  customer::{CustomerUpdate, NewCustomer},
  letter::NewLetter,
  pigeon::{NewPigeon, PigeonUpdate},
};

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn require_non_empty(
  errors: &mut Vec<FieldError>,
  field: &'static str,
  value: &str,
) {
  if value.trim().is_empty() {
    errors.push(FieldError::new(field, "must not be empty"));
  }
}

/// Minimal `local@domain` shape check; full RFC 5322 parsing is out of scope.
fn email_is_plausible(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.is_empty() && domain.contains('.')
    }
    None => false,
  }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
  if !email_is_plausible(email) {
    errors.push(FieldError::new("email", "must be a valid email address"));
  }
}

fn check_speed(errors: &mut Vec<FieldError>, speed: f64) {
  if !(speed > 0.0) || !speed.is_finite() {
    errors.push(FieldError::new(
      "averageSpeed",
      "must be a positive number",
    ));
  }
}

fn check_photo_url(errors: &mut Vec<FieldError>, url: &str) {
  if !(url.starts_with("http://") || url.starts_with("https://")) {
    errors.push(FieldError::new(
      "photoUrl",
      "must be an http(s) URL",
    ));
  }
}

// ─── Per-shape validators ────────────────────────────────────────────────────

pub fn validate_new_pigeon(input: &NewPigeon) -> Vec<FieldError> {
  let mut errors = Vec::new();
  require_non_empty(&mut errors, "nickname", &input.nickname);
  check_speed(&mut errors, input.average_speed);
  if let Some(url) = &input.photo_url {
    check_photo_url(&mut errors, url);
  }
  errors
}

pub fn validate_pigeon_update(input: &PigeonUpdate) -> Vec<FieldError> {
  let mut errors = Vec::new();
  if let Some(nickname) = &input.nickname {
    require_non_empty(&mut errors, "nickname", nickname);
  }
  if let Some(speed) = input.average_speed {
    check_speed(&mut errors, speed);
  }
  if let Some(url) = &input.photo_url {
    check_photo_url(&mut errors, url);
  }
  errors
}

pub fn validate_new_customer(input: &NewCustomer) -> Vec<FieldError> {
  let mut errors = Vec::new();
  require_non_empty(&mut errors, "name", &input.name);
  check_email(&mut errors, &input.email);
  require_non_empty(&mut errors, "address", &input.address);
  errors
}

pub fn validate_customer_update(input: &CustomerUpdate) -> Vec<FieldError> {
  let mut errors = Vec::new();
  if let Some(name) = &input.name {
    require_non_empty(&mut errors, "name", name);
  }
  if let Some(email) = &input.email {
    check_email(&mut errors, email);
  }
  if let Some(address) = &input.address {
    require_non_empty(&mut errors, "address", address);
  }
  errors
}

pub fn validate_new_letter(input: &NewLetter) -> Vec<FieldError> {
  let mut errors = Vec::new();
  require_non_empty(&mut errors, "content", &input.content);
  require_non_empty(&mut errors, "recipientName", &input.recipient_name);
  require_non_empty(&mut errors, "recipientAddress", &input.recipient_address);
  errors
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use uuid::Uuid;

  use super::*;

  fn pigeon_input() -> NewPigeon {
    NewPigeon {
      nickname:      "Flash".into(),
      photo_url:     Some("https://example.com/flash.jpg".into()),
      average_speed: 85.5,
    }
  }

  #[test]
  fn valid_pigeon_passes() {
    assert!(validate_new_pigeon(&pigeon_input()).is_empty());
  }

  #[test]
  fn pigeon_rejects_blank_nickname_and_nonpositive_speed() {
    let mut input = pigeon_input();
    input.nickname = "   ".into();
    input.average_speed = 0.0;
    let errors = validate_new_pigeon(&input);
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert!(fields.contains(&"nickname"));
    assert!(fields.contains(&"averageSpeed"));
  }

  #[test]
  fn pigeon_rejects_non_http_photo_url() {
    let mut input = pigeon_input();
    input.photo_url = Some("ftp://example.com/flash.jpg".into());
    let errors = validate_new_pigeon(&input);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "photoUrl");
  }

  #[test]
  fn customer_rejects_malformed_email() {
    for email in ["", "no-at-sign", "@nodomain", "local@", "a@b"] {
      let input = NewCustomer {
        name:       "João Silva".into(),
        email:      email.into(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap(),
        address:    "Rua das Flores, 123".into(),
      };
      let errors = validate_new_customer(&input);
      assert!(
        errors.iter().any(|e| e.field == "email"),
        "{email:?} should be rejected"
      );
    }
  }

  #[test]
  fn customer_update_validates_only_present_fields() {
    let empty = CustomerUpdate::default();
    assert!(validate_customer_update(&empty).is_empty());

    let bad_email = CustomerUpdate {
      email: Some("nope".into()),
      ..Default::default()
    };
    assert_eq!(validate_customer_update(&bad_email).len(), 1);
  }

  #[test]
  fn letter_requires_content_and_recipient_fields() {
    let input = NewLetter {
      content:           String::new(),
      recipient_name:    " ".into(),
      recipient_address: String::new(),
      sender_id:         Uuid::new_v4(),
      pigeon_id:         Uuid::new_v4(),
    };
    let errors = validate_new_letter(&input);
    assert_eq!(errors.len(), 3);
  }
}
