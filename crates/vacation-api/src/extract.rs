//! Extractors whose rejections speak the API's error vocabulary.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Path, Query, Request},
  http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use vacation_core::{
  Error, identity::Identity, secret::SecretHasher, store::ApprovalStore,
};

use crate::{ApiError, AppState, auth::Authenticator};

// ─── Caller ──────────────────────────────────────────────────────────────────

/// The authenticated identity behind a request. Rejects with `unauthorized`.
pub struct Caller(pub Identity);

impl<S, H, A> FromRequestParts<AppState<S, H, A>> for Caller
where
  S: ApprovalStore + 'static,
  H: SecretHasher + 'static,
  A: Authenticator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, H, A>,
  ) -> Result<Self, Self::Rejection> {
    state
      .auth
      .identify(parts)
      .await
      .map(Caller)
      .ok_or(ApiError(Error::Unauthorized))
  }
}

// ─── JSON body ───────────────────────────────────────────────────────────────

/// Like [`Json`], but a malformed or mistyped body is `invalid_body`.
pub struct JsonBody<T>(pub T);

impl<T, St> FromRequest<St> for JsonBody<T>
where
  T: DeserializeOwned,
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
    match Json::<T>::from_request(req, state).await {
      Ok(Json(value)) => Ok(Self(value)),
      Err(rejection) => Err(ApiError(Error::InvalidBody(rejection.body_text()))),
    }
  }
}

// ─── Query string ────────────────────────────────────────────────────────────

/// Like [`Query`], but an unparseable query string is `invalid_body`.
pub struct QueryParams<T>(pub T);

impl<T, St> FromRequestParts<St> for QueryParams<T>
where
  T: DeserializeOwned,
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
    match Query::<T>::from_request_parts(parts, state).await {
      Ok(Query(value)) => Ok(Self(value)),
      Err(rejection) => Err(ApiError(Error::InvalidBody(rejection.body_text()))),
    }
  }
}

// ─── Path id ─────────────────────────────────────────────────────────────────

/// A `{id}` path segment. Anything that is not a UUID names no resource and
/// is `not_found`.
pub struct IdPath(pub Uuid);

impl<St> FromRequestParts<St> for IdPath
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
    Path::<Uuid>::from_request_parts(parts, state)
      .await
      .map(|Path(id)| Self(id))
      .map_err(|_| ApiError(Error::NotFound))
  }
}
