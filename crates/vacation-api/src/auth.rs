//! The authenticator seam.
//!
//! The API never inspects credentials itself. Whatever sits in front of it
//! (HTTP Basic in the server binary, a fixed table in tests) turns request
//! headers into an [`Identity`] or nothing.

use std::future::Future;

use axum::http::request::Parts;
use vacation_core::identity::Identity;

pub trait Authenticator: Send + Sync {
  /// Resolve the caller, or `None` if the request carries no valid
  /// credentials.
  fn identify<'a>(
    &'a self,
    parts: &'a Parts,
  ) -> impl Future<Output = Option<Identity>> + Send + 'a;
}
