//! Handlers for `/customers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/customers` | Body: [`NewCustomer`]; returns 201 |
//! | `GET`    | `/customers` | Name-ordered, with letter counts |
//! | `GET`    | `/customers/:id` | Detail with sent letters |
//! | `PATCH`  | `/customers/:id` | Partial update |
//! | `DELETE` | `/customers/:id` | Refused while letters reference the customer |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use loft_core::{
  customer::{
    Customer, CustomerDetail, CustomerUpdate, CustomerWithCount, NewCustomer,
  },
  store::DeliveryStore,
  validate::{validate_customer_update, validate_new_customer},
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ensure_valid, store_err};

/// `POST /customers`
pub async fn create<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCustomer>,
) -> Result<impl IntoResponse, ApiError> {
  ensure_valid(validate_new_customer(&body))?;
  let customer = store.add_customer(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(customer)))
}

/// `GET /customers`
pub async fn list<S: DeliveryStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<CustomerWithCount>>, ApiError> {
  let customers = store.list_customers().await.map_err(store_err)?;
  Ok(Json(customers))
}

/// `GET /customers/:id`
pub async fn get_one<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CustomerDetail>, ApiError> {
  let detail = store
    .get_customer_detail(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("customer {id} not found")))?;
  Ok(Json(detail))
}

/// `PATCH /customers/:id`
pub async fn update<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CustomerUpdate>,
) -> Result<Json<Customer>, ApiError> {
  if body.is_empty() {
    return Err(ApiError::BadRequest("update contains no fields".into()));
  }
  ensure_valid(validate_customer_update(&body))?;
  let customer = store
    .update_customer(id, body)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("customer {id} not found")))?;
  Ok(Json(customer))
}

/// `DELETE /customers/:id`
///
/// Referential guard: a customer with letters cannot be removed. The checks
/// run before the delete; the letters foreign key is only a backstop.
pub async fn remove<S: DeliveryStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let customer = store
    .get_customer(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("customer {id} not found")))?;

  let letters = store
    .count_letters_for_sender(id)
    .await
    .map_err(store_err)?;
  if letters > 0 {
    return Err(ApiError::from(loft_core::Error::CustomerHasLetters {
      id,
      letters,
    }));
  }

  store.delete_customer(id).await.map_err(store_err)?;
  Ok(Json(json!({
    "message": format!("customer {} removed", customer.name)
  })))
}
