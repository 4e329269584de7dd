//! Handlers for `/users` endpoints. Supervisors only.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | Accounts with their latest proposals |
//! | `POST` | `/users` | Body: `{"name","email","login_code","password","role"}` |
//! | `PUT` / `PATCH` | `/users/{id}` | Partial edit; email and password become proposals when `id` is not the caller |
//! | `DELETE` | `/users/{id}` | Idempotent |

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use vacation_core::{
  account::CreateAccount, edit::AccountEdit, secret::SecretHasher,
  store::ApprovalStore,
};

use crate::{
  AppState,
  auth::Authenticator,
  error::ApiError,
  extract::{Caller, IdPath, JsonBody},
};

/// `GET /users`
pub async fn list<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let users = state.engine.list_accounts(&who).await?;
  Ok(Json(json!({ "users": users })))
}

/// `POST /users`
pub async fn create<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  JsonBody(body): JsonBody<CreateAccount>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let account = state.engine.create_account(&who, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "user": account }))))
}

/// `PUT /users/{id}` and `PATCH /users/{id}`
pub async fn update<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
  JsonBody(body): JsonBody<AccountEdit>,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let outcome = state.engine.update_account(&who, id, body).await?;
  Ok(Json(json!({
    "ok":              true,
    "password_status": outcome.password_status,
    "email_status":    outcome.email_status,
    "proposal_ids":    outcome.proposal_ids,
  })))
}

/// `DELETE /users/{id}`
pub async fn remove<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  state.engine.delete_account(&who, id).await?;
  Ok(Json(json!({ "ok": true })))
}
