//! HTTP Basic authenticator: the username is the 7-digit login code.

use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use vacation_api::Authenticator;
use vacation_core::{
  account::LoginCode, identity::Identity, secret::SecretHasher, store::ApprovalStore,
};

/// Resolves `Authorization: Basic …` against the account store.
pub struct BasicAuthenticator<S, H> {
  store:  S,
  hasher: H,
}

impl<S, H> BasicAuthenticator<S, H> {
  pub fn new(store: S, hasher: H) -> Self { Self { store, hasher } }
}

/// Split a Basic header into `(login code, password)`.
fn basic_credentials(headers: &HeaderMap) -> Option<(LoginCode, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = std::str::from_utf8(&decoded).ok()?;
  let (code, password) = creds.split_once(':')?;
  let code = LoginCode::parse(code.trim()).ok()?;
  Some((code, password.to_owned()))
}

impl<S, H> Authenticator for BasicAuthenticator<S, H>
where
  S: ApprovalStore,
  H: SecretHasher,
{
  async fn identify<'a>(&'a self, parts: &'a Parts) -> Option<Identity> {
    let (code, password) = basic_credentials(&parts.headers)?;
    let credential = match self.store.credential_by_login_code(code).await {
      Ok(found) => found?,
      Err(e) => {
        tracing::warn!(error = %e, "credential lookup failed");
        return None;
      }
    };
    if !self.hasher.matches(&password, &credential.digest) {
      return None;
    }
    Some(Identity::new(credential.subject_id, credential.role))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{body::Body, http::Request};
  use vacation_core::account::{NewAccount, Role};
  use vacation_store_sqlite::SqliteStore;

  use crate::hasher::Argon2Hasher;

  async fn make_auth(password: &str) -> (BasicAuthenticator<SqliteStore, Argon2Hasher>, uuid::Uuid) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let account = store
      .create_account(NewAccount {
        display_name:      "Ethan Employee".into(),
        contact_address:   "ethan.employee@example.com".into(),
        login_code:        LoginCode::parse("2000001").unwrap(),
        credential_digest: Argon2Hasher.digest(password).unwrap(),
        role:              Role::Subordinate,
      })
      .await
      .unwrap();
    (BasicAuthenticator::new(store, Argon2Hasher), account.id)
  }

  async fn identify(
    auth: &BasicAuthenticator<SqliteStore, Argon2Hasher>,
    authorization: Option<&str>,
  ) -> Option<Identity> {
    let mut req = Request::builder();
    if let Some(value) = authorization {
      req = req.header(header::AUTHORIZATION, value);
    }
    let (parts, _) = req.body(Body::empty()).unwrap().into_parts();
    auth.identify(&parts).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials() {
    let (auth, id) = make_auth("Password1!").await;
    let who = identify(&auth, Some(basic("2000001", "Password1!").as_str())).await.unwrap();
    assert_eq!(who.subject_id, id);
    assert_eq!(who.role, Role::Subordinate);
  }

  #[tokio::test]
  async fn wrong_password() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, Some(basic("2000001", "nope").as_str())).await.is_none());
  }

  #[tokio::test]
  async fn unknown_login_code() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, Some(basic("2000002", "Password1!").as_str())).await.is_none());
  }

  #[tokio::test]
  async fn malformed_login_code() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, Some(basic("ethan", "Password1!").as_str())).await.is_none());
  }

  #[tokio::test]
  async fn padded_login_code_signs_in() {
    let (auth, id) = make_auth("Password1!").await;
    let who = identify(&auth, Some(basic(" 2000001 ", "Password1!").as_str())).await.unwrap();
    assert_eq!(who.subject_id, id);
  }

  #[tokio::test]
  async fn missing_header() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, None).await.is_none());
  }

  #[tokio::test]
  async fn invalid_base64() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, Some("Basic !!!notbase64!!!")).await.is_none());
  }

  #[tokio::test]
  async fn wrong_scheme() {
    let (auth, _) = make_auth("Password1!").await;
    assert!(identify(&auth, Some("Bearer 2000001")).await.is_none());
  }
}
