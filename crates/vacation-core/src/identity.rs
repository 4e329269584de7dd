//! The acting identity handed to the engine by an authenticator.
//!
//! The engine trusts an [`Identity`] completely; it never re-checks
//! credentials.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, account::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub subject_id: Uuid,
  pub role:       Role,
}

impl Identity {
  pub fn new(subject_id: Uuid, role: Role) -> Self { Self { subject_id, role } }

  /// `Forbidden` unless this identity holds `role`.
  pub fn require(&self, role: Role) -> Result<()> {
    if self.role == role { Ok(()) } else { Err(Error::Forbidden) }
  }

  pub fn is(&self, subject_id: Uuid) -> bool { self.subject_id == subject_id }
}
