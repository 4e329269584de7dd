//! Change-proposal statements.
//!
//! The partial unique index `change_proposals_one_pending` allows at most one
//! `pending` row per `(subject_id, kind)`, so [`supersede_pending`] must run
//! before every [`insert`] in the same transaction.

use rusqlite::{Connection, OptionalExtension as _, Transaction, params};
use vacation_core::proposal::{ChangeProposal, ProposalPayload};

use crate::encode::{RawPending, encode_dt, encode_kind, encode_status, encode_uuid};

pub struct ProposalRow {
  pub proposal_id:      String,
  pub subject_id:       String,
  pub initiator_id:     String,
  pub kind:             &'static str,
  pub candidate:        String,
  pub candidate_digest: Option<String>,
  pub status:           &'static str,
  pub created_at:       String,
}

impl From<&ChangeProposal> for ProposalRow {
  fn from(p: &ChangeProposal) -> Self {
    let (candidate, candidate_digest) = match &p.payload {
      ProposalPayload::Password(escrow) => {
        (escrow.plaintext().to_owned(), Some(escrow.digest().to_owned()))
      }
      ProposalPayload::Email { address } => (address.clone(), None),
    };
    Self {
      proposal_id: encode_uuid(p.id),
      subject_id: encode_uuid(p.subject_id),
      initiator_id: encode_uuid(p.initiator_id),
      kind: encode_kind(p.payload.kind()),
      candidate,
      candidate_digest,
      status: encode_status(p.status),
      created_at: encode_dt(p.created_at),
    }
  }
}

/// Delete every undecided proposal of `kind` for `subject`.
pub fn supersede_pending(
  tx: &Transaction<'_>,
  subject: &str,
  kind: &str,
) -> rusqlite::Result<usize> {
  tx.execute(
    "DELETE FROM change_proposals
     WHERE subject_id = ?1 AND kind = ?2 AND status = 'pending'",
    params![subject, kind],
  )
}

pub fn insert(tx: &Transaction<'_>, row: &ProposalRow) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO change_proposals (
       proposal_id, subject_id, initiator_id, kind, candidate,
       candidate_digest, status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      row.proposal_id,
      row.subject_id,
      row.initiator_id,
      row.kind,
      row.candidate,
      row.candidate_digest,
      row.status,
      row.created_at,
    ],
  )?;
  Ok(())
}

/// The id of the newest pending proposal of `kind` for `subject`, read under
/// the transaction's write lock.
pub fn lock_newest_pending(
  tx: &Transaction<'_>,
  subject: &str,
  kind: &str,
) -> rusqlite::Result<Option<String>> {
  tx.query_row(
    "SELECT proposal_id FROM change_proposals
     WHERE subject_id = ?1 AND kind = ?2 AND status = 'pending'
     ORDER BY created_at DESC, rowid DESC LIMIT 1",
    params![subject, kind],
    |row| row.get(0),
  )
  .optional()
}

/// Copy the proposal's candidate onto its subject's account.
pub fn apply_payload(
  tx: &Transaction<'_>,
  proposal_id: &str,
  kind: &str,
) -> rusqlite::Result<()> {
  let sql = match kind {
    "password" => {
      "UPDATE accounts SET credential_digest = (
         SELECT candidate_digest FROM change_proposals WHERE proposal_id = ?1
       )
       WHERE account_id = (
         SELECT subject_id FROM change_proposals WHERE proposal_id = ?1
       )"
    }
    _ => {
      "UPDATE accounts SET contact_address = (
         SELECT candidate FROM change_proposals WHERE proposal_id = ?1
       )
       WHERE account_id = (
         SELECT subject_id FROM change_proposals WHERE proposal_id = ?1
       )"
    }
  };
  tx.execute(sql, params![proposal_id])?;
  Ok(())
}

pub fn mark_decided(
  tx: &Transaction<'_>,
  proposal_id: &str,
  status: &str,
  decided_at: &str,
) -> rusqlite::Result<bool> {
  let n = tx.execute(
    "UPDATE change_proposals SET status = ?2, decided_at = ?3
     WHERE proposal_id = ?1 AND status = 'pending'",
    params![proposal_id, status, decided_at],
  )?;
  Ok(n == 1)
}

/// Lock, apply on approval, and stamp. Returns the decided proposal's id, or
/// `None` when nothing was pending.
pub fn respond(
  tx: &Transaction<'_>,
  subject: &str,
  kind: &str,
  status: &str,
  decided_at: &str,
) -> rusqlite::Result<Option<String>> {
  let Some(id) = lock_newest_pending(tx, subject, kind)? else {
    return Ok(None);
  };
  if status == "approved" {
    apply_payload(tx, &id, kind)?;
  }
  let stamped = mark_decided(tx, &id, status, decided_at)?;
  debug_assert!(stamped, "locked proposal {id} was no longer pending");
  Ok(Some(id))
}

/// The newest pending proposal of `kind` for `subject`, joined with the
/// account that initiated it.
pub fn pending_view(
  conn: &Connection,
  subject: &str,
  kind: &str,
) -> rusqlite::Result<Option<RawPending>> {
  conn
    .query_row(
      "SELECT p.proposal_id, p.kind, p.candidate, p.created_at,
              i.display_name, i.contact_address
       FROM change_proposals p
       JOIN accounts i ON i.account_id = p.initiator_id
       WHERE p.subject_id = ?1 AND p.kind = ?2 AND p.status = 'pending'
       ORDER BY p.created_at DESC, p.rowid DESC LIMIT 1",
      params![subject, kind],
      |row| {
        Ok(RawPending {
          proposal_id:       row.get(0)?,
          kind:              row.get(1)?,
          candidate:         row.get(2)?,
          created_at:        row.get(3)?,
          initiator_name:    row.get(4)?,
          initiator_address: row.get(5)?,
        })
      },
    )
    .optional()
}
