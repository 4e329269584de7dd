//! JSON REST API for the vacation portal.
//!
//! Exposes an axum [`Router`] over an [`ApprovalEngine`]. Credential checks
//! are delegated to an [`Authenticator`]; TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vacation_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod me;
pub mod requests;
pub mod users;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, patch, post, put},
};
use serde_json::{Value, json};
use vacation_core::{ApprovalEngine, secret::SecretHasher, store::ApprovalStore};

pub use auth::Authenticator;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, H, A> {
  pub engine: Arc<ApprovalEngine<S, H>>,
  pub auth:   Arc<A>,
}

impl<S, H, A> AppState<S, H, A> {
  pub fn new(engine: ApprovalEngine<S, H>, auth: A) -> Self {
    Self { engine: Arc::new(engine), auth: Arc::new(auth) }
  }
}

// Not derived: `#[derive(Clone)]` would bound `S`, `H` and `A` on `Clone`.
impl<S, H, A> Clone for AppState<S, H, A> {
  fn clone(&self) -> Self {
    Self { engine: Arc::clone(&self.engine), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, H, A>(state: AppState<S, H, A>) -> Router<()>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  Router::new()
    .route("/health", get(health))
    // The caller's own account
    .route("/me", get(me::show::<S, H, A>))
    .route("/me/password", patch(me::change_password::<S, H, A>))
    .route("/me/pending-password", get(me::pending_password::<S, H, A>))
    .route("/me/pending-password/respond", post(me::respond_password::<S, H, A>))
    .route("/me/pending-email", get(me::pending_email::<S, H, A>))
    .route("/me/pending-email/respond", post(me::respond_email::<S, H, A>))
    // Account administration
    .route("/users", get(users::list::<S, H, A>).post(users::create::<S, H, A>))
    .route(
      "/users/{id}",
      put(users::update::<S, H, A>)
        .patch(users::update::<S, H, A>)
        .delete(users::remove::<S, H, A>),
    )
    .route("/users/{id}/requests", get(requests::history::<S, H, A>))
    // Vacation ledger
    .route("/requests", get(requests::list::<S, H, A>).post(requests::submit::<S, H, A>))
    .route("/requests/{id}", delete(requests::withdraw::<S, H, A>))
    .route("/requests/{id}/approve", post(requests::approve::<S, H, A>))
    .route("/requests/{id}/reject", post(requests::reject::<S, H, A>))
    .with_state(state)
}

/// `GET /health`, unauthenticated.
async fn health() -> Json<Value> { Json(json!({ "ok": true })) }

#[cfg(test)]
mod tests;
