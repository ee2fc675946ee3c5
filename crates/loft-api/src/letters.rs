//! Handlers for `/letters` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/letters` | Body: [`NewLetter`]; returns 201; status is always QUEUED |
//! | `GET`   | `/letters` | Newest first, with party summaries |
//! | `GET`   | `/letters/status/:status` | Exact status filter |
//! | `GET`   | `/letters/:id` | 404 if not found |
//! | `PATCH` | `/letters/:id/status` | Body: `{"status":"SENT"}` — the only mutation |
//!
//! Everything here goes through the lifecycle guard; there is no route that
//! edits a letter's content, recipient, or party references.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use loft_core::{
  letter::{
    LetterStatus, LetterWithParties, LetterWithRefs, NewLetter,
  },
  lifecycle::LetterService,
  store::DeliveryStore,
  validate::validate_new_letter,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ensure_valid};

/// `POST /letters`
pub async fn create<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewLetter>,
) -> Result<impl IntoResponse, ApiError> {
  ensure_valid(validate_new_letter(&body))?;
  let created = LetterService::new(store).create(body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /letters`
pub async fn list<S: DeliveryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<LetterWithParties>>, ApiError> {
  let letters = LetterService::new(store).list().await?;
  Ok(Json(letters))
}

/// `GET /letters/status/:status` — `:status` is the uppercase wire name.
pub async fn list_by_status<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(status): Path<LetterStatus>,
) -> Result<Json<Vec<LetterWithRefs>>, ApiError> {
  let letters = LetterService::new(store).find_by_status(status).await?;
  Ok(Json(letters))
}

/// `GET /letters/:id`
pub async fn get_one<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LetterWithParties>, ApiError> {
  let letter = LetterService::new(store).get(id).await?;
  Ok(Json(letter))
}

/// JSON body accepted by `PATCH /letters/:id/status`. Status is the only
/// revisable field, so nothing else is accepted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusBody {
  pub status: LetterStatus,
}

/// `PATCH /letters/:id/status`
pub async fn update_status<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateStatusBody>,
) -> Result<Json<LetterWithRefs>, ApiError> {
  let updated = LetterService::new(store)
    .update_status(id, body.status)
    .await?;
  Ok(Json(updated))
}
