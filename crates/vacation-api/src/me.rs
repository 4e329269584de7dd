//! Handlers for the caller's own account under `/me`.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/me` | |
//! | `PATCH` | `/me/password` | Body: `{"current_password","new_password"}` |
//! | `GET`   | `/me/pending-password` | `{"proposal": null}` when none |
//! | `POST`  | `/me/pending-password/respond` | Body: `{"action":"approve"\|"reject"}` |
//! | `GET`   | `/me/pending-email` | |
//! | `POST`  | `/me/pending-email/respond` | |

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use vacation_core::{
  identity::Identity,
  proposal::{ProposalKind, ResponseAction},
  secret::SecretHasher,
  store::ApprovalStore,
};

use crate::{
  AppState,
  auth::Authenticator,
  error::ApiError,
  extract::{Caller, JsonBody},
};

/// `GET /me`
pub async fn show<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let account = state.engine.me(&who).await?;
  Ok(Json(json!({ "user": account })))
}

// ─── Own password ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordBody {
  pub current_password: String,
  pub new_password:     String,
}

/// `PATCH /me/password`
pub async fn change_password<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  JsonBody(body): JsonBody<PasswordBody>,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  state
    .engine
    .change_own_password(&who, &body.current_password, &body.new_password)
    .await?;
  Ok(Json(json!({ "ok": true })))
}

// ─── Pending proposals ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub action: ResponseAction,
}

async fn pending<S, H, A>(
  state: &AppState<S, H, A>,
  who: &Identity,
  kind: ProposalKind,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let proposal = state.engine.pending_proposal(who, kind).await?;
  Ok(Json(json!({ "proposal": proposal })))
}

async fn respond<S, H, A>(
  state: &AppState<S, H, A>,
  who: &Identity,
  kind: ProposalKind,
  action: ResponseAction,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let decided = state.engine.respond_to_proposal(who, kind, action).await?;
  Ok(Json(json!({ "ok": true, "status": decided.status, "id": decided.id })))
}

/// `GET /me/pending-password`
pub async fn pending_password<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  pending(&state, &who, ProposalKind::Password).await
}

/// `POST /me/pending-password/respond`
pub async fn respond_password<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  JsonBody(body): JsonBody<RespondBody>,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  respond(&state, &who, ProposalKind::Password, body.action).await
}

/// `GET /me/pending-email`
pub async fn pending_email<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  pending(&state, &who, ProposalKind::Email).await
}

/// `POST /me/pending-email/respond`
pub async fn respond_email<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  JsonBody(body): JsonBody<RespondBody>,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  respond(&state, &who, ProposalKind::Email, body.action).await
}
