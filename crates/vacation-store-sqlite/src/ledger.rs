//! Vacation-ledger statements.

use rusqlite::{Connection, params};
use vacation_core::vacation::VacationRequest;

use crate::encode::{
  REQUEST_COLUMNS, RawRequest, RawRequestWithOwner,
  encode_date, encode_dt, encode_status, encode_uuid,
};

pub struct RequestRow {
  pub request_id:   String,
  pub subject_id:   String,
  pub date_from:    String,
  pub date_to:      String,
  pub reason:       Option<String>,
  pub status:       &'static str,
  pub submitted_at: String,
}

impl From<&VacationRequest> for RequestRow {
  fn from(r: &VacationRequest) -> Self {
    Self {
      request_id:   encode_uuid(r.id),
      subject_id:   encode_uuid(r.subject_id),
      date_from:    encode_date(r.date_from),
      date_to:      encode_date(r.date_to),
      reason:       r.reason.clone(),
      status:       encode_status(r.status),
      submitted_at: encode_dt(r.submitted_at),
    }
  }
}

pub fn insert(conn: &Connection, row: &RequestRow) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO vacation_requests (
       request_id, subject_id, date_from, date_to, reason, status, submitted_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      row.request_id,
      row.subject_id,
      row.date_from,
      row.date_to,
      row.reason,
      row.status,
      row.submitted_at,
    ],
  )?;
  Ok(())
}

/// Conditional single-statement transition: only a row still `pending` moves.
pub fn decide(conn: &Connection, id: &str, status: &str) -> rusqlite::Result<bool> {
  let n = conn.execute(
    "UPDATE vacation_requests SET status = ?2
     WHERE request_id = ?1 AND status = 'pending'",
    params![id, status],
  )?;
  Ok(n == 1)
}

pub fn withdraw(conn: &Connection, id: &str, owner: &str) -> rusqlite::Result<bool> {
  let n = conn.execute(
    "DELETE FROM vacation_requests
     WHERE request_id = ?1 AND subject_id = ?2 AND status = 'pending'",
    params![id, owner],
  )?;
  Ok(n == 1)
}

pub fn list_for(conn: &Connection, subject: &str) -> rusqlite::Result<Vec<RawRequest>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {REQUEST_COLUMNS} FROM vacation_requests r
     WHERE r.subject_id = ?1
     ORDER BY r.submitted_at DESC, r.rowid DESC"
  ))?;
  let rows = stmt
    .query_map(params![subject], RawRequest::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<RawRequestWithOwner>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {REQUEST_COLUMNS}, a.display_name, a.contact_address
     FROM vacation_requests r
     JOIN accounts a ON a.account_id = r.subject_id
     ORDER BY r.submitted_at DESC, r.rowid DESC"
  ))?;
  let rows = stmt
    .query_map([], |row| {
      Ok(RawRequestWithOwner {
        request:       RawRequest::from_row(row)?,
        owner_name:    row.get(7)?,
        owner_address: row.get(8)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
