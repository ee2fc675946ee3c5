//! JSON REST API for the Loft delivery tracker.
//!
//! Exposes an axum [`Router`] backed by any [`loft_core::store::DeliveryStore`].
//! CORS, tracing, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = loft_api::api_router(store.clone());
//! ```

pub mod customers;
pub mod error;
pub mod letters;
pub mod pigeons;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use loft_core::store::DeliveryStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DeliveryStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Pigeons
    .route("/pigeons", get(pigeons::list::<S>).post(pigeons::create::<S>))
    .route("/pigeons/all", get(pigeons::list_all::<S>))
    .route(
      "/pigeons/{id}",
      get(pigeons::get_one::<S>)
        .patch(pigeons::update::<S>)
        .delete(pigeons::retire::<S>),
    )
    .route("/pigeons/{id}/retire", patch(pigeons::retire::<S>))
    // Customers
    .route(
      "/customers",
      get(customers::list::<S>).post(customers::create::<S>),
    )
    .route(
      "/customers/{id}",
      get(customers::get_one::<S>)
        .patch(customers::update::<S>)
        .delete(customers::remove::<S>),
    )
    // Letters
    .route("/letters", get(letters::list::<S>).post(letters::create::<S>))
    .route("/letters/status/{status}", get(letters::list_by_status::<S>))
    .route("/letters/{id}", get(letters::get_one::<S>))
    .route("/letters/{id}/status", patch(letters::update_status::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
