//! Wiring for the vacation portal server: argon2 credentials, HTTP Basic
//! authentication over the SQLite store, and the traced API router.

pub mod auth;
pub mod error;
pub mod hasher;
pub mod seed;

use std::path::PathBuf;

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use vacation_api::{AppState, api_router};
use vacation_core::ApprovalEngine;
use vacation_store_sqlite::SqliteStore;

pub use auth::BasicAuthenticator;
pub use error::{Error, Result};
pub use hasher::Argon2Hasher;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Top-level server configuration, deserialised from `config.toml` and
/// `VACATION_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the full HTTP application over `store`.
pub fn app(store: SqliteStore) -> Router {
  let engine = ApprovalEngine::new(store.clone(), Argon2Hasher);
  let auth = BasicAuthenticator::new(store, Argon2Hasher);
  api_router(AppState::new(engine, auth)).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;
  use crate::seed::{SEED_PASSWORD, seed};

  async fn seeded_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    seed(&store, &Argon2Hasher).await.unwrap();
    app(store)
  }

  fn basic(code: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{code}:{pass}")))
  }

  async fn get_me(app: Router, authorization: Option<String>) -> (StatusCode, Value) {
    let mut req = Request::get("/me");
    if let Some(value) = authorization {
      req = req.header(header::AUTHORIZATION, value);
    }
    let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn seeded_supervisor_can_sign_in() {
    let app = seeded_app().await;
    let (status, body) = get_me(app, Some(basic("1000001", SEED_PASSWORD))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "supervisor");
    assert_eq!(body["user"]["login_code"], "1000001");
  }

  #[tokio::test]
  async fn bad_credentials_are_unauthorized() {
    let app = seeded_app().await;
    let (status, body) = get_me(app, Some(basic("1000001", "wrong-password"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  #[tokio::test]
  async fn subordinate_cannot_list_accounts() {
    let app = seeded_app().await;
    let req = Request::get("/users")
      .header(header::AUTHORIZATION, basic("2000001", SEED_PASSWORD))
      .body(Body::empty())
      .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
  }
}
