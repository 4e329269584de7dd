//! Error types for `vacation-core`.
//!
//! Every variant maps to a stable wire code via [`Error::code`]. State
//! conflicts are worded so a caller cannot tell "already decided" apart from
//! "never existed".

use thiserror::Error;

/// A boxed storage or hashing failure, kept opaque at the boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  // ── Authorization ───────────────────────────────────────────────────────
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  // ── Validation ──────────────────────────────────────────────────────────
  #[error("invalid body: {0}")]
  InvalidBody(String),

  #[error("invalid dates")]
  InvalidDates,

  #[error("date_to is earlier than date_from")]
  DateRange,

  #[error("password must be at least {min} characters")]
  PasswordTooShort { min: usize },

  #[error("current password does not match")]
  InvalidCurrentPassword,

  #[error("missing fields")]
  MissingFields,

  #[error("login code must be exactly 7 digits")]
  InvalidLoginCode,

  #[error("nothing to update")]
  NothingToUpdate,

  // ── State conflicts ─────────────────────────────────────────────────────
  #[error("not found")]
  NotFound,

  #[error("not found or not pending")]
  NotFoundOrNotPending,

  #[error("no pending update")]
  NoPendingUpdate,

  // ── Persistence ─────────────────────────────────────────────────────────
  #[error("update failed: {0}")]
  UpdateFailed(#[source] BoxError),

  #[error("create failed: {0}")]
  CreateFailed(#[source] BoxError),

  #[error("storage error: {0}")]
  Storage(#[source] BoxError),
}

impl Error {
  /// The stable code sent to callers in the `error` field.
  pub fn code(&self) -> &'static str {
    match self {
      Self::Unauthorized => "unauthorized",
      Self::Forbidden => "forbidden",
      Self::InvalidBody(_) => "invalid_body",
      Self::InvalidDates => "invalid_dates",
      Self::DateRange => "date_range",
      Self::PasswordTooShort { .. } => "password_too_short",
      Self::InvalidCurrentPassword => "invalid_current_password",
      Self::MissingFields => "missing_fields",
      Self::InvalidLoginCode => "invalid_login_code",
      Self::NothingToUpdate => "nothing_to_update",
      Self::NotFound => "not_found",
      Self::NotFoundOrNotPending => "not_found_or_not_pending",
      Self::NoPendingUpdate => "no_pending_update",
      Self::UpdateFailed(_) => "update_failed",
      Self::CreateFailed(_) => "create_failed",
      Self::Storage(_) => "internal_error",
    }
  }

  /// Optional human-readable detail for the `detail` field.
  pub fn detail(&self) -> Option<String> {
    match self {
      Self::InvalidBody(msg) if !msg.is_empty() => Some(msg.clone()),
      Self::PasswordTooShort { min } => {
        Some(format!("Password must be at least {min} characters."))
      }
      Self::UpdateFailed(e) | Self::CreateFailed(e) => Some(e.to_string()),
      _ => None,
    }
  }

  pub(crate) fn update_failed<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::UpdateFailed(Box::new(e))
  }

  pub(crate) fn create_failed<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::CreateFailed(Box::new(e))
  }

  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
