//! Router tests: real SQLite store in memory, fixed-token authenticator.

use std::collections::HashMap;

use axum::{
  body::Body,
  http::{Request, StatusCode, header, request::Parts},
  response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use vacation_core::{
  ApprovalEngine,
  account::{Account, LoginCode, NewAccount, Role},
  identity::Identity,
  secret::SecretHasher,
  store::ApprovalStore,
};
use vacation_store_sqlite::SqliteStore;

use crate::{AppState, Authenticator, api_router};

/// `Authorization: Bearer <token>` looked up in a fixed table.
struct TokenAuth(HashMap<String, Identity>);

impl Authenticator for TokenAuth {
  async fn identify<'a>(&'a self, parts: &'a Parts) -> Option<Identity> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    self.0.get(token).copied()
  }
}

struct PlainHasher;

impl SecretHasher for PlainHasher {
  type Error = std::convert::Infallible;

  fn digest(&self, plaintext: &str) -> Result<String, Self::Error> {
    Ok(format!("plain:{plaintext}"))
  }

  fn matches(&self, plaintext: &str, digest: &str) -> bool {
    digest.strip_prefix("plain:") == Some(plaintext)
  }
}

type TestState = AppState<SqliteStore, PlainHasher, TokenAuth>;

struct Fixture {
  state:  TestState,
  worker: Account,
}

/// Tokens: `boss` is a supervisor, `ethan` a subordinate.
async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let account = |name: &str, code: &str, role| NewAccount {
    display_name: name.into(),
    contact_address: format!("{code}@example.com"),
    login_code: LoginCode::parse(code).unwrap(),
    credential_digest: "plain:Password1!".into(),
    role,
  };
  let boss = store
    .create_account(account("Maggie Manager", "1000001", Role::Supervisor))
    .await
    .unwrap();
  let worker = store
    .create_account(account("Ethan Employee", "2000001", Role::Subordinate))
    .await
    .unwrap();

  let tokens = HashMap::from([
    ("boss".to_string(), Identity::new(boss.id, boss.role)),
    ("ethan".to_string(), Identity::new(worker.id, worker.role)),
  ]);
  let state = AppState::new(ApprovalEngine::new(store, PlainHasher), TokenAuth(tokens));
  Fixture { state, worker }
}

async fn call(
  state: &TestState,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<&str>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let body = match body {
    Some(b) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(b.to_string())
    }
    None => Body::empty(),
  };
  api_router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn expect_error(resp: Response, status: StatusCode, code: &str) {
  assert_eq!(resp.status(), status);
  assert_eq!(json_body(resp).await["error"], code);
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_credentials() {
  let f = fixture().await;
  let resp = call(&f.state, "GET", "/health", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "ok": true }));
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
  let f = fixture().await;
  let resp = call(&f.state, "GET", "/me", None, None).await;
  expect_error(resp, StatusCode::UNAUTHORIZED, "unauthorized").await;

  let resp = call(&f.state, "GET", "/me", Some("nobody"), None).await;
  expect_error(resp, StatusCode::UNAUTHORIZED, "unauthorized").await;
}

#[tokio::test]
async fn me_hides_the_digest() {
  let f = fixture().await;
  let resp = call(&f.state, "GET", "/me", Some("ethan"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["user"]["display_name"], "Ethan Employee");
  assert_eq!(body["user"]["role"], "subordinate");
  assert!(body["user"].get("credential_digest").is_none());
}

#[tokio::test]
async fn subordinates_cannot_administer() {
  let f = fixture().await;
  let resp = call(&f.state, "GET", "/users", Some("ethan"), None).await;
  expect_error(resp, StatusCode::FORBIDDEN, "forbidden").await;

  let resp = call(&f.state, "GET", "/requests", Some("ethan"), None).await;
  expect_error(resp, StatusCode::FORBIDDEN, "forbidden").await;
}

// ── Vacation ledger ───────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_approve_then_reject_conflicts() {
  let f = fixture().await;
  let body = r#"{"date_from":"2025-06-01","date_to":"2025-06-03","reason":"trip"}"#;
  let resp = call(&f.state, "POST", "/requests", Some("ethan"), Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = json_body(resp).await;
  assert_eq!(created["request"]["status"], "pending");
  let id = created["request"]["id"].as_str().unwrap().to_string();

  let resp = call(&f.state, "POST", &format!("/requests/{id}/approve"), Some("boss"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "approved");

  let resp = call(&f.state, "POST", &format!("/requests/{id}/reject"), Some("boss"), None).await;
  expect_error(resp, StatusCode::NOT_FOUND, "not_found_or_not_pending").await;

  let resp = call(&f.state, "GET", "/requests?mine=true", Some("ethan"), None).await;
  let mine = json_body(resp).await;
  assert_eq!(mine["requests"][0]["status"], "approved");
}

#[tokio::test]
async fn inverted_dates_are_rejected() {
  let f = fixture().await;
  let body = r#"{"date_from":"2025-06-03","date_to":"2025-06-01"}"#;
  let resp = call(&f.state, "POST", "/requests", Some("ethan"), Some(body)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "date_range").await;

  let body = r#"{"date_from":"June 1st","date_to":"2025-06-01"}"#;
  let resp = call(&f.state, "POST", "/requests", Some("ethan"), Some(body)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_dates").await;
}

#[tokio::test]
async fn malformed_json_is_invalid_body() {
  let f = fixture().await;
  let resp = call(&f.state, "POST", "/requests", Some("ethan"), Some("{not json")).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_body").await;
}

#[tokio::test]
async fn malformed_query_is_invalid_body() {
  let f = fixture().await;
  let resp = call(&f.state, "GET", "/requests?mine=yes", Some("ethan"), None).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_body").await;

  let resp = call(&f.state, "GET", "/requests?mine=true", Some("ethan"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn withdraw_twice_succeeds() {
  let f = fixture().await;
  let body = r#"{"date_from":"2025-06-01","date_to":"2025-06-01"}"#;
  let resp = call(&f.state, "POST", "/requests", Some("ethan"), Some(body)).await;
  let id = json_body(resp).await["request"]["id"].as_str().unwrap().to_string();

  for _ in 0..2 {
    let resp = call(&f.state, "DELETE", &format!("/requests/{id}"), Some("ethan"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
  let resp = call(&f.state, "GET", "/requests", Some("boss"), None).await;
  assert_eq!(json_body(resp).await["requests"], json!([]));
}

#[tokio::test]
async fn non_uuid_ids_are_not_found() {
  let f = fixture().await;
  let resp = call(&f.state, "POST", "/requests/42/approve", Some("boss"), None).await;
  expect_error(resp, StatusCode::NOT_FOUND, "not_found").await;
}

#[tokio::test]
async fn history_lists_one_account() {
  let f = fixture().await;
  let body = r#"{"date_from":"2025-06-01","date_to":"2025-06-02"}"#;
  call(&f.state, "POST", "/requests", Some("ethan"), Some(body)).await;

  let uri = format!("/users/{}/requests", f.worker.id);
  let resp = call(&f.state, "GET", &uri, Some("boss"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["user"]["display_name"], "Ethan Employee");
  assert_eq!(body["requests"].as_array().unwrap().len(), 1);

  let uri = format!("/users/{}/requests", uuid::Uuid::new_v4());
  let resp = call(&f.state, "GET", &uri, Some("boss"), None).await;
  expect_error(resp, StatusCode::NOT_FOUND, "not_found").await;
}

// ── Accounts and proposals ────────────────────────────────────────────────────

#[tokio::test]
async fn email_edit_becomes_a_proposal_the_subject_approves() {
  let f = fixture().await;
  let uri = format!("/users/{}", f.worker.id);
  let edit = r#"{"name":"Ethan E.","email":"ethan@x.com"}"#;
  let resp = call(&f.state, "PATCH", &uri, Some("boss"), Some(edit)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let outcome = json_body(resp).await;
  assert_eq!(outcome["email_status"], "pending");
  assert_eq!(outcome["password_status"], Value::Null);

  let resp = call(&f.state, "GET", "/me/pending-email", Some("ethan"), None).await;
  let pending = json_body(resp).await;
  assert_eq!(pending["proposal"]["candidate"], "ethan@x.com");
  assert_eq!(pending["proposal"]["initiator_name"], "Maggie Manager");

  let resp = call(
    &f.state,
    "POST",
    "/me/pending-email/respond",
    Some("ethan"),
    Some(r#"{"action":"approve"}"#),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["status"], "approved");

  let resp = call(&f.state, "GET", "/me", Some("ethan"), None).await;
  let me = json_body(resp).await;
  assert_eq!(me["user"]["contact_address"], "ethan@x.com");
  assert_eq!(me["user"]["display_name"], "Ethan E.");

  let resp = call(&f.state, "GET", "/me/pending-email", Some("ethan"), None).await;
  assert_eq!(json_body(resp).await, json!({ "proposal": null }));
}

#[tokio::test]
async fn respond_validates_action_and_pending_state() {
  let f = fixture().await;
  let resp = call(
    &f.state,
    "POST",
    "/me/pending-password/respond",
    Some("ethan"),
    Some(r#"{"action":"maybe"}"#),
  )
  .await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_body").await;

  let resp = call(
    &f.state,
    "POST",
    "/me/pending-password/respond",
    Some("ethan"),
    Some(r#"{"action":"reject"}"#),
  )
  .await;
  expect_error(resp, StatusCode::NOT_FOUND, "no_pending_update").await;
}

#[tokio::test]
async fn short_password_edit_is_rejected_with_detail() {
  let f = fixture().await;
  let uri = format!("/users/{}", f.worker.id);
  let resp = call(&f.state, "PUT", &uri, Some("boss"), Some(r#"{"password":"short"}"#)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "password_too_short");
  assert!(body["detail"].as_str().unwrap().contains('8'));

  let resp = call(&f.state, "PUT", &uri, Some("boss"), Some("{}")).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "nothing_to_update").await;
}

#[tokio::test]
async fn own_password_change_checks_current() {
  let f = fixture().await;
  let wrong = r#"{"current_password":"wrong","new_password":"NewPass123"}"#;
  let resp = call(&f.state, "PATCH", "/me/password", Some("ethan"), Some(wrong)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_current_password").await;

  let right = r#"{"current_password":"Password1!","new_password":"NewPass123"}"#;
  let resp = call(&f.state, "PATCH", "/me/password", Some("ethan"), Some(right)).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = call(&f.state, "PATCH", "/me/password", Some("ethan"), Some("{}")).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "missing_fields").await;
}

#[tokio::test]
async fn create_account_validates_and_reports_conflicts() {
  let f = fixture().await;
  let bad_code = r#"{"name":"Nia","email":"nia@x.com","login_code":"12345","password":"Password1!","role":"subordinate"}"#;
  let resp = call(&f.state, "POST", "/users", Some("boss"), Some(bad_code)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_login_code").await;

  let padded = r#"{"name":"Nia","email":"nia@x.com","login_code":" 3000001","password":"Password1!","role":"subordinate"}"#;
  let resp = call(&f.state, "POST", "/users", Some("boss"), Some(padded)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "invalid_login_code").await;

  let good = r#"{"name":"Nia","email":"nia@x.com","employee_code":"3000001","password":"Password1!","role":"subordinate"}"#;
  let resp = call(&f.state, "POST", "/users", Some("boss"), Some(good)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(json_body(resp).await["user"]["login_code"], "3000001");

  let resp = call(&f.state, "POST", "/users", Some("boss"), Some(good)).await;
  expect_error(resp, StatusCode::BAD_REQUEST, "create_failed").await;

  let resp = call(&f.state, "GET", "/users", Some("boss"), None).await;
  assert_eq!(json_body(resp).await["users"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn delete_account_is_idempotent() {
  let f = fixture().await;
  let uri = format!("/users/{}", f.worker.id);
  for _ in 0..2 {
    let resp = call(&f.state, "DELETE", &uri, Some("boss"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
  let resp = call(&f.state, "GET", "/users", Some("boss"), None).await;
  assert_eq!(json_body(resp).await["users"].as_array().unwrap().len(), 1);
}
