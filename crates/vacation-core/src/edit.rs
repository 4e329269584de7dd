//! Account edits and the direct-vs-proposed decision table.
//!
//! A supervisor editing their own account writes every field directly. A
//! supervisor editing someone else writes name and role directly, but email
//! and password become proposals the target must approve.
//!
//! | field    | actor == target | actor != target |
//! |----------|-----------------|-----------------|
//! | name     | direct          | direct          |
//! | role     | direct          | direct          |
//! | email    | direct          | proposed        |
//! | password | direct          | proposed        |

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  account::Role,
  identity::Identity,
  proposal::{ProposalKind, ProposalPayload},
  secret::validate_password,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// Raw edit request body. Blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountEdit {
  pub name:     Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
  pub role:     Option<Role>,
}

/// One recognised, trimmed, non-empty field of an [`AccountEdit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditField {
  Name(String),
  Role(Role),
  Email(String),
  Password(String),
}

impl AccountEdit {
  /// The recognised fields, in a fixed order.
  pub fn fields(self) -> Vec<EditField> {
    fn present(v: Option<String>) -> Option<String> {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    }

    let mut out = Vec::with_capacity(4);
    if let Some(name) = present(self.name) {
      out.push(EditField::Name(name));
    }
    if let Some(email) = present(self.email) {
      out.push(EditField::Email(email));
    }
    if let Some(role) = self.role {
      out.push(EditField::Role(role));
    }
    if let Some(password) = present(self.password) {
      out.push(EditField::Password(password));
    }
    out
  }
}

// ─── Routing ─────────────────────────────────────────────────────────────────

/// A credential value that must be ratified by the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposedValue {
  Email(String),
  Password(String),
}

impl ProposedValue {
  pub fn kind(&self) -> ProposalKind {
    match self {
      Self::Email(_) => ProposalKind::Email,
      Self::Password(_) => ProposalKind::Password,
    }
  }

  /// Enforce the per-kind payload rules and trim.
  pub fn validate(self) -> Result<Self> {
    match self {
      Self::Password(p) => Ok(Self::Password(validate_password(&p)?)),
      Self::Email(e) => {
        let e = e.trim();
        if e.is_empty() {
          Err(Error::MissingFields)
        } else {
          Ok(Self::Email(e.to_owned()))
        }
      }
    }
  }
}

/// How a single field reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedEdit {
  DirectEdit(EditField),
  ProposedEdit(ProposedValue),
}

/// The decision table. Pure; `self_edit` is `actor == target`.
pub fn route(self_edit: bool, field: EditField) -> PlannedEdit {
  match (self_edit, field) {
    (_, f @ (EditField::Name(_) | EditField::Role(_))) => {
      PlannedEdit::DirectEdit(f)
    }
    (true, f) => PlannedEdit::DirectEdit(f),
    (false, EditField::Email(address)) => {
      PlannedEdit::ProposedEdit(ProposedValue::Email(address))
    }
    (false, EditField::Password(p)) => {
      PlannedEdit::ProposedEdit(ProposedValue::Password(p))
    }
  }
}

/// Validate `edit` and route every field. Fails before any I/O.
pub fn plan(
  actor: &Identity,
  target: Uuid,
  edit: AccountEdit,
) -> Result<Vec<PlannedEdit>> {
  let self_edit = actor.is(target);
  let fields = edit.fields();

  for f in &fields {
    if let EditField::Password(p) = f {
      validate_password(p)?;
    }
  }
  if fields.is_empty() {
    return Err(Error::NothingToUpdate);
  }

  Ok(fields.into_iter().map(|f| route(self_edit, f)).collect())
}

// ─── Resolved write ──────────────────────────────────────────────────────────

/// Column writes applied straight to the target account.
#[derive(Debug, Clone, Default)]
pub struct DirectChanges {
  pub display_name:      Option<String>,
  pub role:              Option<Role>,
  pub contact_address:   Option<String>,
  pub credential_digest: Option<String>,
}

impl DirectChanges {
  pub fn is_empty(&self) -> bool {
    self.display_name.is_none()
      && self.role.is_none()
      && self.contact_address.is_none()
      && self.credential_digest.is_none()
  }
}

/// Everything one edit does to storage, with secrets already digested.
/// The store applies it in a single transaction.
#[derive(Debug, Clone, Default)]
pub struct AccountWrite {
  pub direct:    DirectChanges,
  pub proposals: Vec<ProposalPayload>,
}

/// Per-credential outcome reported back to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
  Updated,
  Pending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
  pub password_status: Option<FieldStatus>,
  pub email_status:    Option<FieldStatus>,
  pub proposal_ids:    Vec<Uuid>,
}
