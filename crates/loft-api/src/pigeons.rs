//! Handlers for `/pigeons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/pigeons` | Body: [`NewPigeon`]; returns 201 |
//! | `GET`    | `/pigeons` | Active pigeons only |
//! | `GET`    | `/pigeons/all` | Including retired |
//! | `GET`    | `/pigeons/:id` | Detail with assigned letters |
//! | `PATCH`  | `/pigeons/:id` | Partial update; cannot touch `isActive` |
//! | `PATCH`  | `/pigeons/:id/retire` | One-way |
//! | `DELETE` | `/pigeons/:id` | Alias of retire — pigeons are never deleted |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use loft_core::{
  pigeon::{NewPigeon, Pigeon, PigeonDetail, PigeonUpdate},
  store::DeliveryStore,
  validate::{validate_new_pigeon, validate_pigeon_update},
};
use uuid::Uuid;

use crate::error::{ApiError, ensure_valid, store_err};

/// `POST /pigeons`
pub async fn create<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPigeon>,
) -> Result<impl IntoResponse, ApiError> {
  ensure_valid(validate_new_pigeon(&body))?;
  let pigeon = store.add_pigeon(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(pigeon)))
}

/// `GET /pigeons` — active couriers only.
pub async fn list<S: DeliveryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Pigeon>>, ApiError> {
  let pigeons = store.list_pigeons(false).await.map_err(store_err)?;
  Ok(Json(pigeons))
}

/// `GET /pigeons/all` — the whole roster, retirees included.
pub async fn list_all<S: DeliveryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Pigeon>>, ApiError> {
  let pigeons = store.list_pigeons(true).await.map_err(store_err)?;
  Ok(Json(pigeons))
}

/// `GET /pigeons/:id`
pub async fn get_one<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PigeonDetail>, ApiError> {
  let detail = store
    .get_pigeon_detail(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("pigeon {id} not found")))?;
  Ok(Json(detail))
}

/// `PATCH /pigeons/:id`
pub async fn update<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PigeonUpdate>,
) -> Result<Json<Pigeon>, ApiError> {
  if body.is_empty() {
    return Err(ApiError::BadRequest("update contains no fields".into()));
  }
  ensure_valid(validate_pigeon_update(&body))?;
  let pigeon = store
    .update_pigeon(id, body)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("pigeon {id} not found")))?;
  Ok(Json(pigeon))
}

/// `PATCH /pigeons/:id/retire` (and `DELETE /pigeons/:id`).
pub async fn retire<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Pigeon>, ApiError> {
  let pigeon = store
    .retire_pigeon(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("pigeon {id} not found")))?;
  Ok(Json(pigeon))
}
