//! Vacation ledger entries.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, account::Account, lifecycle::Status};

/// A time-off request. `date_to >= date_from` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRequest {
  pub id:           Uuid,
  pub subject_id:   Uuid,
  pub date_from:    NaiveDate,
  pub date_to:      NaiveDate,
  pub reason:       Option<String>,
  pub status:       Status,
  pub submitted_at: DateTime<Utc>,
}

/// A request joined with its owner, for the supervisor's queue.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithOwner {
  #[serde(flatten)]
  pub request:       VacationRequest,
  pub owner_name:    String,
  pub owner_address: String,
}

/// One subordinate's full request history.
#[derive(Debug, Clone, Serialize)]
pub struct RequestHistory {
  pub account:  Account,
  pub requests: Vec<VacationRequest>,
}

/// Result of a successful decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecidedRequest {
  pub id:     Uuid,
  pub status: Status,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// Raw submission input; dates are still strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
  pub date_from: Option<String>,
  pub date_to:   Option<String>,
  pub reason:    Option<String>,
}

/// Input to [`crate::store::ApprovalStore::submit_request`]. Validated;
/// `submitted_at` and the id are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewVacationRequest {
  pub subject_id: Uuid,
  pub date_from:  NaiveDate,
  pub date_to:    NaiveDate,
  pub reason:     Option<String>,
}

impl SubmitRequest {
  /// Validate into a [`NewVacationRequest`] for `subject_id`.
  ///
  /// Missing dates are `invalid_body`, unparseable ones `invalid_dates`, and
  /// an inverted range `date_range`. A blank reason becomes `None`.
  pub fn validate(self, subject_id: Uuid) -> Result<NewVacationRequest> {
    let (from, to) = match (self.date_from, self.date_to) {
      (Some(f), Some(t)) if !f.trim().is_empty() && !t.trim().is_empty() => {
        (f, t)
      }
      _ => {
        return Err(Error::InvalidBody(
          "date_from and date_to are required".into(),
        ));
      }
    };

    let date_from = parse_request_date(&from)?;
    let date_to = parse_request_date(&to)?;
    if date_to < date_from {
      return Err(Error::DateRange);
    }

    let reason = self
      .reason
      .map(|r| r.trim().to_owned())
      .filter(|r| !r.is_empty());

    Ok(NewVacationRequest { subject_id, date_from, date_to, reason })
  }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC calendar date).
///
/// The year must fit in four digits: stored dates compare as text.
pub fn parse_request_date(raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    Ok(d) => d,
    Err(_) => DateTime::parse_from_rfc3339(raw)
      .map(|dt| dt.with_timezone(&Utc).date_naive())
      .map_err(|_| Error::InvalidDates)?,
  };
  if !(0..=9999).contains(&date.year()) {
    return Err(Error::InvalidDates);
  }
  Ok(date)
}
