//! Handlers for the vacation ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requests` | Supervisors: every request with its owner. `?mine=true`: the caller's own |
//! | `POST` | `/requests` | Subordinates. Body: `{"date_from","date_to","reason"?}` |
//! | `POST` | `/requests/{id}/approve` | Supervisors |
//! | `POST` | `/requests/{id}/reject` | Supervisors |
//! | `DELETE` | `/requests/{id}` | Owner withdraws while pending; idempotent |
//! | `GET`  | `/users/{id}/requests` | Supervisors: one account's history |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use vacation_core::{
  identity::Identity, lifecycle::Decision, secret::SecretHasher, store::ApprovalStore,
  vacation::SubmitRequest,
};

use crate::{
  AppState,
  auth::Authenticator,
  error::ApiError,
  extract::{Caller, IdPath, JsonBody, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub mine: bool,
}

/// `GET /requests[?mine=true]`
pub async fn list<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  if params.mine {
    let requests = state.engine.list_my_requests(&who).await?;
    return Ok(Json(json!({ "requests": requests })));
  }
  let requests = state.engine.list_all_requests(&who).await?;
  Ok(Json(json!({ "requests": requests })))
}

/// `GET /users/{id}/requests`
pub async fn history<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let history = state.engine.request_history(&who, id).await?;
  Ok(Json(json!({ "user": history.account, "requests": history.requests })))
}

// ─── Submit / withdraw ────────────────────────────────────────────────────────

/// `POST /requests`
pub async fn submit<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  JsonBody(body): JsonBody<SubmitRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let request = state.engine.submit_request(&who, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "ok": true, "request": request }))))
}

/// `DELETE /requests/{id}`
pub async fn withdraw<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  state.engine.withdraw_request(&who, id).await?;
  Ok(Json(json!({ "ok": true })))
}

// ─── Decide ───────────────────────────────────────────────────────────────────

async fn decide<S, H, A>(
  state: AppState<S, H, A>,
  who: Identity,
  id: Uuid,
  decision: Decision,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  let decided = state.engine.decide_request(&who, id, decision).await?;
  Ok(Json(json!({ "ok": true, "id": decided.id, "status": decided.status })))
}

/// `POST /requests/{id}/approve`
pub async fn approve<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  decide(state, who, id, Decision::Approved).await
}

/// `POST /requests/{id}/reject`
pub async fn reject<S, H, A>(
  State(state): State<AppState<S, H, A>>,
  Caller(who): Caller,
  IdPath(id): IdPath,
) -> Result<Json<Value>, ApiError>
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  decide(state, who, id, Decision::Rejected).await
}
