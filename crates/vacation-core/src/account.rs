//! Accounts: the identity store's records.
//!
//! The credential digest never appears on [`Account`]; it is only reachable
//! through [`Credential`], which the store hands to the authenticator and to
//! the self-service password change.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, proposal::ProposalSummary};

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Supervisor,
  Subordinate,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Supervisor => "supervisor",
      Self::Subordinate => "subordinate",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── LoginCode ───────────────────────────────────────────────────────────────

/// A login code: exactly seven ASCII decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LoginCode(String);

impl LoginCode {
  pub const LEN: usize = 7;

  /// Validate a raw code exactly as given; padding is rejected.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidLoginCode)
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for LoginCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl fmt::Display for LoginCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for LoginCode {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// A persisted account, minus its credential digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub id:              Uuid,
  pub display_name:    String,
  pub contact_address: String,
  pub login_code:      LoginCode,
  pub role:            Role,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::ApprovalStore::create_account`].
/// The id and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub display_name:      String,
  pub contact_address:   String,
  pub login_code:        LoginCode,
  pub credential_digest: String,
  pub role:              Role,
}

/// What the store reveals about an account's secret.
#[derive(Debug, Clone)]
pub struct Credential {
  pub subject_id: Uuid,
  pub role:       Role,
  pub digest:     String,
}

/// An account as a supervisor sees it in the directory: the account plus
/// the most recent proposal of each kind that targeted it.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOverview {
  #[serde(flatten)]
  pub account:          Account,
  pub pending_password: Option<ProposalSummary>,
  pub pending_email:    Option<ProposalSummary>,
}

// ─── Create request ──────────────────────────────────────────────────────────

/// Raw account-creation input as submitted by a supervisor.
///
/// Every field is required; absent and blank fields are reported together as
/// `invalid_body`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAccount {
  #[serde(default)]
  pub name:       String,
  #[serde(default)]
  pub email:      String,
  #[serde(default, alias = "employee_code")]
  pub login_code: String,
  #[serde(default)]
  pub password:   String,
  pub role:       Option<Role>,
}

/// A [`CreateAccount`] that passed validation. The password is still
/// plaintext; the engine digests it.
#[derive(Debug, Clone)]
pub struct ValidAccount {
  pub display_name:    String,
  pub contact_address: String,
  pub login_code:      LoginCode,
  pub password:        String,
  pub role:            Role,
}

impl CreateAccount {
  pub fn validate(self) -> Result<ValidAccount> {
    let name = self.name.trim();
    let email = self.email.trim();
    let password = self.password.trim();
    let role = match self.role {
      Some(role)
        if !name.is_empty()
          && !email.is_empty()
          && !self.login_code.trim().is_empty()
          && !password.is_empty() =>
      {
        role
      }
      _ => return Err(Error::InvalidBody(String::new())),
    };

    let login_code = LoginCode::parse(&self.login_code)?;
    let password = crate::secret::validate_password(password)?;

    Ok(ValidAccount {
      display_name: name.to_owned(),
      contact_address: email.to_owned(),
      login_code,
      password,
      role,
    })
  }
}
