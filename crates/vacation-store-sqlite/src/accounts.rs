//! Identity-store statements.
//!
//! Every function takes the connection or transaction it runs on; none of
//! them opens or commits a transaction itself.

use rusqlite::{Connection, OptionalExtension as _, Transaction, params};
use vacation_core::{
  account::{Account, NewAccount},
  edit::DirectChanges,
};

use crate::encode::{
  ACCOUNT_COLUMNS, RawAccount, RawCredential, RawOverview, RawSummary,
  encode_dt, encode_role, encode_uuid,
};

/// An `accounts` row, encoded and ready to bind.
pub struct AccountRow {
  pub account_id:        String,
  pub display_name:      String,
  pub contact_address:   String,
  pub login_code:        String,
  pub credential_digest: String,
  pub role:              &'static str,
  pub created_at:        String,
}

impl AccountRow {
  pub fn new(account: &Account, input: NewAccount) -> Self {
    Self {
      account_id:        encode_uuid(account.id),
      display_name:      input.display_name,
      contact_address:   input.contact_address,
      login_code:        input.login_code.as_str().to_owned(),
      credential_digest: input.credential_digest,
      role:              encode_role(input.role),
      created_at:        encode_dt(account.created_at),
    }
  }
}

pub fn insert(conn: &Connection, row: &AccountRow) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO accounts (
       account_id, display_name, contact_address, login_code,
       credential_digest, role, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      row.account_id,
      row.display_name,
      row.contact_address,
      row.login_code,
      row.credential_digest,
      row.role,
      row.created_at,
    ],
  )?;
  Ok(())
}

pub fn fetch(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawAccount>> {
  conn
    .query_row(
      &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.account_id = ?1"),
      params![id],
      |row| RawAccount::from_row(row, 0),
    )
    .optional()
}

/// Every account, newest first, each joined with its most recent password
/// and email proposal.
pub fn list_overviews(conn: &Connection) -> rusqlite::Result<Vec<RawOverview>> {
  let sql = format!(
    "SELECT {ACCOUNT_COLUMNS},
            pp.status, pp.created_at, pp.decided_at, NULL,
            pe.status, pe.created_at, pe.decided_at, pe.candidate
     FROM accounts a
     LEFT JOIN change_proposals pp ON pp.proposal_id = (
       SELECT proposal_id FROM change_proposals
       WHERE subject_id = a.account_id AND kind = 'password'
       ORDER BY created_at DESC, rowid DESC LIMIT 1
     )
     LEFT JOIN change_proposals pe ON pe.proposal_id = (
       SELECT proposal_id FROM change_proposals
       WHERE subject_id = a.account_id AND kind = 'email'
       ORDER BY created_at DESC, rowid DESC LIMIT 1
     )
     ORDER BY a.created_at DESC, a.rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map([], |row| {
      Ok(RawOverview {
        account:  RawAccount::from_row(row, 0)?,
        password: RawSummary::from_row(row, 6)?,
        email:    RawSummary::from_row(row, 10)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Delete an account; foreign keys cascade to its requests and proposals.
pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
  let n = conn.execute("DELETE FROM accounts WHERE account_id = ?1", params![id])?;
  Ok(n > 0)
}

pub fn credential_by_id(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawCredential>> {
  conn
    .query_row(
      "SELECT account_id, role, credential_digest FROM accounts WHERE account_id = ?1",
      params![id],
      raw_credential,
    )
    .optional()
}

pub fn credential_by_login_code(
  conn: &Connection,
  code: &str,
) -> rusqlite::Result<Option<RawCredential>> {
  conn
    .query_row(
      "SELECT account_id, role, credential_digest FROM accounts WHERE login_code = ?1",
      params![code],
      raw_credential,
    )
    .optional()
}

fn raw_credential(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCredential> {
  Ok(RawCredential {
    account_id: row.get(0)?,
    role:       row.get(1)?,
    digest:     row.get(2)?,
  })
}

/// Swap the digest only while it still equals `expected`.
pub fn replace_digest(
  conn: &Connection,
  id: &str,
  expected: &str,
  next: &str,
) -> rusqlite::Result<bool> {
  let n = conn.execute(
    "UPDATE accounts SET credential_digest = ?3
     WHERE account_id = ?1 AND credential_digest = ?2",
    params![id, expected, next],
  )?;
  Ok(n == 1)
}

/// Confirm the target row exists inside a write-locked transaction.
///
/// SQLite has no row locks; the `IMMEDIATE` transaction this runs in already
/// holds the database write lock, so the row cannot be deleted or changed by
/// another writer until the transaction ends.
pub fn lock_target(tx: &Transaction<'_>, id: &str) -> rusqlite::Result<bool> {
  Ok(
    tx.query_row(
      "SELECT 1 FROM accounts WHERE account_id = ?1",
      params![id],
      |_| Ok(()),
    )
    .optional()?
    .is_some(),
  )
}

/// `DirectChanges` encoded for binding.
#[derive(Default)]
pub struct DirectRow {
  columns: Vec<(&'static str, String)>,
}

impl From<DirectChanges> for DirectRow {
  fn from(c: DirectChanges) -> Self {
    let mut columns = Vec::new();
    if let Some(v) = c.display_name {
      columns.push(("display_name", v));
    }
    if let Some(v) = c.contact_address {
      columns.push(("contact_address", v));
    }
    if let Some(v) = c.role {
      columns.push(("role", encode_role(v).to_owned()));
    }
    if let Some(v) = c.credential_digest {
      columns.push(("credential_digest", v));
    }
    Self { columns }
  }
}

/// Apply direct column writes to `id`. A no-op for an empty change set.
pub fn apply_direct(
  tx: &Transaction<'_>,
  id: &str,
  row: &DirectRow,
) -> rusqlite::Result<()> {
  if row.columns.is_empty() {
    return Ok(());
  }
  let assignments = row
    .columns
    .iter()
    .enumerate()
    .map(|(i, (col, _))| format!("{col} = ?{}", i + 2))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!("UPDATE accounts SET {assignments} WHERE account_id = ?1");

  let values = std::iter::once(id).chain(row.columns.iter().map(|(_, v)| v.as_str()));
  tx.execute(&sql, rusqlite::params_from_iter(values))?;
  Ok(())
}
