//! The three-state lifecycle shared by vacation requests and change
//! proposals.
//!
//! Both start `Pending` and move exactly once to a terminal state. Nothing
//! ever leaves a terminal state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current status of a ledger entry or proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Pending,
  Approved,
  Rejected,
}

impl Status {
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A terminal outcome chosen by whoever decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
  Approved,
  Rejected,
}

impl Decision {
  pub fn status(self) -> Status {
    match self {
      Self::Approved => Status::Approved,
      Self::Rejected => Status::Rejected,
    }
  }
}

impl From<Decision> for Status {
  fn from(d: Decision) -> Self { d.status() }
}
