//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use vacation_core::Error;

/// An error returned by an API handler: an engine error rendered as
/// `{"error": <code>, "detail"?: <text>}`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match &self.0 {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::NotFound | Error::NotFoundOrNotPending | Error::NoPendingUpdate => {
        StatusCode::NOT_FOUND
      }
      Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      _ => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self.0, "request failed");
    }

    let body = match self.0.detail() {
      Some(detail) => json!({ "error": self.0.code(), "detail": detail }),
      None => json!({ "error": self.0.code() }),
    };
    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"vacation\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn state_conflicts_are_not_found() {
    assert_eq!(ApiError(Error::NoPendingUpdate).status(), StatusCode::NOT_FOUND);
    assert_eq!(
      ApiError(Error::NotFoundOrNotPending).status(),
      StatusCode::NOT_FOUND
    );
  }

  #[test]
  fn persistence_failures_are_bad_requests() {
    let e = Error::UpdateFailed("duplicate".into());
    assert_eq!(ApiError(e).status(), StatusCode::BAD_REQUEST);
  }
}
