//! Change proposals: supervisor-initiated credential changes that the
//! target must ratify.
//!
//! At most one proposal per `(subject, kind)` is pending at any time. A newer
//! proposal supersedes (deletes) an undecided older one rather than stacking.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::{Decision, Status};

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
  Password,
  Email,
}

impl ProposalKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Password => "password",
      Self::Email => "email",
    }
  }
}

impl fmt::Display for ProposalKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A proposed password held in escrow until the subject decides.
///
/// The plaintext is retained on purpose: the subject is shown the exact
/// candidate before approving. This type is the only place it lives, and
/// [`PendingProposal`] is the only read path that exposes it.
#[derive(Clone)]
pub struct PasswordEscrow {
  plaintext: String,
  digest:    String,
}

impl PasswordEscrow {
  pub fn new(plaintext: String, digest: String) -> Self {
    Self { plaintext, digest }
  }

  pub fn plaintext(&self) -> &str { &self.plaintext }

  pub fn digest(&self) -> &str { &self.digest }
}

impl fmt::Debug for PasswordEscrow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PasswordEscrow")
      .field("plaintext", &"<redacted>")
      .field("digest", &self.digest)
      .finish()
  }
}

/// What a proposal would change if approved.
#[derive(Debug, Clone)]
pub enum ProposalPayload {
  Password(PasswordEscrow),
  Email { address: String },
}

impl ProposalPayload {
  pub fn kind(&self) -> ProposalKind {
    match self {
      Self::Password(_) => ProposalKind::Password,
      Self::Email { .. } => ProposalKind::Email,
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted proposal.
#[derive(Debug, Clone)]
pub struct ChangeProposal {
  pub id:           Uuid,
  pub subject_id:   Uuid,
  pub initiator_id: Uuid,
  pub payload:      ProposalPayload,
  pub status:       Status,
  pub created_at:   DateTime<Utc>,
  pub decided_at:   Option<DateTime<Utc>>,
}

/// The subject's view of its outstanding proposal of one kind.
#[derive(Debug, Clone, Serialize)]
pub struct PendingProposal {
  pub id:                Uuid,
  pub kind:              ProposalKind,
  /// The candidate address, or the escrowed candidate password.
  pub candidate:         String,
  pub created_at:        DateTime<Utc>,
  pub initiator_name:    String,
  pub initiator_address: String,
}

/// The latest proposal of one kind against an account, for directory
/// listings. The password candidate is never included here.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
  pub status:            Status,
  pub created_at:        DateTime<Utc>,
  pub decided_at:        Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub candidate_address: Option<String>,
}

/// Result of a subject's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecidedProposal {
  pub id:         Uuid,
  pub kind:       ProposalKind,
  pub status:     Status,
  pub decided_at: DateTime<Utc>,
}

// ─── Response ────────────────────────────────────────────────────────────────

/// The subject's answer to a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
  Approve,
  Reject,
}

impl ResponseAction {
  pub fn decision(self) -> Decision {
    match self {
      Self::Approve => Decision::Approved,
      Self::Reject => Decision::Rejected,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escrow_debug_hides_plaintext() {
    let escrow = PasswordEscrow::new("hunter2hunter2".into(), "d1".into());
    let shown = format!("{escrow:?}");
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("d1"));
    assert_eq!(escrow.plaintext(), "hunter2hunter2");
  }

  #[test]
  fn payload_kind() {
    let p = ProposalPayload::Email { address: "a@x.com".into() };
    assert_eq!(p.kind(), ProposalKind::Email);
    let p = ProposalPayload::Password(PasswordEscrow::new("x".into(), "y".into()));
    assert_eq!(p.kind(), ProposalKind::Password);
  }

  #[test]
  fn response_action_wire_format() {
    let a: ResponseAction = serde_json::from_str("\"approve\"").unwrap();
    assert_eq!(a.decision(), Decision::Approved);
    assert!(serde_json::from_str::<ResponseAction>("\"maybe\"").is_err());
  }
}
