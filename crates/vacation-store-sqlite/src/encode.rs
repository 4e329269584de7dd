//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with fixed microsecond
//! precision, so lexical order in SQL equals chronological order. Calendar
//! dates are `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;
use vacation_core::{
  account::{Account, AccountOverview, Credential, LoginCode, Role},
  lifecycle::Status,
  proposal::{PendingProposal, ProposalKind, ProposalSummary},
  vacation::{RequestWithOwner, VacationRequest},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "supervisor" => Ok(Role::Supervisor),
    "subordinate" => Ok(Role::Subordinate),
    other => Err(unknown("role", other)),
  }
}

pub fn encode_status(s: Status) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "pending" => Ok(Status::Pending),
    "approved" => Ok(Status::Approved),
    "rejected" => Ok(Status::Rejected),
    other => Err(unknown("status", other)),
  }
}

pub fn encode_kind(k: ProposalKind) -> &'static str { k.as_str() }

pub fn decode_kind(s: &str) -> Result<ProposalKind> {
  match s {
    "password" => Ok(ProposalKind::Password),
    "email" => Ok(ProposalKind::Email),
    other => Err(unknown("kind", other)),
  }
}

fn unknown(column: &'static str, value: &str) -> Error {
  Error::UnknownValue { column, value: value.to_owned() }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:      String,
  pub display_name:    String,
  pub contact_address: String,
  pub login_code:      String,
  pub role:            String,
  pub created_at:      String,
}

/// Column list matching [`RawAccount::from_row`], for an `accounts a` alias.
pub const ACCOUNT_COLUMNS: &str =
  "a.account_id, a.display_name, a.contact_address, a.login_code, a.role, a.created_at";

impl RawAccount {
  /// Read the six [`ACCOUNT_COLUMNS`] starting at column `at`.
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:      row.get(at)?,
      display_name:    row.get(at + 1)?,
      contact_address: row.get(at + 2)?,
      login_code:      row.get(at + 3)?,
      role:            row.get(at + 4)?,
      created_at:      row.get(at + 5)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:              decode_uuid(&self.account_id)?,
      display_name:    self.display_name,
      contact_address: self.contact_address,
      login_code:      LoginCode::parse(&self.login_code)?,
      role:            decode_role(&self.role)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCredential {
  pub account_id: String,
  pub role:       String,
  pub digest:     String,
}

impl RawCredential {
  pub fn into_credential(self) -> Result<Credential> {
    Ok(Credential {
      subject_id: decode_uuid(&self.account_id)?,
      role:       decode_role(&self.role)?,
      digest:     self.digest,
    })
  }
}

/// Latest-proposal columns joined onto an account row; all `None` when the
/// account has never been the subject of a proposal of that kind.
pub struct RawSummary {
  pub status:     Option<String>,
  pub created_at: Option<String>,
  pub decided_at: Option<String>,
  pub candidate:  Option<String>,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      status:     row.get(at)?,
      created_at: row.get(at + 1)?,
      decided_at: row.get(at + 2)?,
      candidate:  row.get(at + 3)?,
    })
  }

  pub fn into_summary(self) -> Result<Option<ProposalSummary>> {
    let (Some(status), Some(created_at)) = (self.status, self.created_at) else {
      return Ok(None);
    };
    Ok(Some(ProposalSummary {
      status:            decode_status(&status)?,
      created_at:        decode_dt(&created_at)?,
      decided_at:        self.decided_at.as_deref().map(decode_dt).transpose()?,
      candidate_address: self.candidate,
    }))
  }
}

pub struct RawOverview {
  pub account:  RawAccount,
  pub password: RawSummary,
  pub email:    RawSummary,
}

impl RawOverview {
  pub fn into_overview(self) -> Result<AccountOverview> {
    Ok(AccountOverview {
      account:          self.account.into_account()?,
      pending_password: self.password.into_summary()?,
      pending_email:    self.email.into_summary()?,
    })
  }
}

/// Raw strings read directly from a `vacation_requests` row.
pub struct RawRequest {
  pub request_id:   String,
  pub subject_id:   String,
  pub date_from:    String,
  pub date_to:      String,
  pub reason:       Option<String>,
  pub status:       String,
  pub submitted_at: String,
}

/// Column list matching [`RawRequest::from_row`], for a `vacation_requests r`
/// alias.
pub const REQUEST_COLUMNS: &str =
  "r.request_id, r.subject_id, r.date_from, r.date_to, r.reason, r.status, r.submitted_at";

impl RawRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:   row.get(0)?,
      subject_id:   row.get(1)?,
      date_from:    row.get(2)?,
      date_to:      row.get(3)?,
      reason:       row.get(4)?,
      status:       row.get(5)?,
      submitted_at: row.get(6)?,
    })
  }

  pub fn into_request(self) -> Result<VacationRequest> {
    Ok(VacationRequest {
      id:           decode_uuid(&self.request_id)?,
      subject_id:   decode_uuid(&self.subject_id)?,
      date_from:    decode_date(&self.date_from)?,
      date_to:      decode_date(&self.date_to)?,
      reason:       self.reason,
      status:       decode_status(&self.status)?,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}

pub struct RawRequestWithOwner {
  pub request:       RawRequest,
  pub owner_name:    String,
  pub owner_address: String,
}

impl RawRequestWithOwner {
  pub fn into_request_with_owner(self) -> Result<RequestWithOwner> {
    Ok(RequestWithOwner {
      request:       self.request.into_request()?,
      owner_name:    self.owner_name,
      owner_address: self.owner_address,
    })
  }
}

/// A pending proposal joined with its initiator.
pub struct RawPending {
  pub proposal_id:       String,
  pub kind:              String,
  pub candidate:         String,
  pub created_at:        String,
  pub initiator_name:    String,
  pub initiator_address: String,
}

impl RawPending {
  pub fn into_pending(self) -> Result<PendingProposal> {
    Ok(PendingProposal {
      id:                decode_uuid(&self.proposal_id)?,
      kind:              decode_kind(&self.kind)?,
      candidate:         self.candidate,
      created_at:        decode_dt(&self.created_at)?,
      initiator_name:    self.initiator_name,
      initiator_address: self.initiator_address,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone as _;

  #[test]
  fn timestamps_sort_lexically() {
    let whole = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let later = whole + chrono::Duration::microseconds(1);
    let (a, b) = (encode_dt(whole), encode_dt(later));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn unknown_enum_values_are_errors() {
    assert!(matches!(
      decode_status("withdrawn"),
      Err(Error::UnknownValue { column: "status", .. })
    ));
    assert!(decode_role("manager").is_err());
    assert!(decode_kind("phone").is_err());
  }
}
