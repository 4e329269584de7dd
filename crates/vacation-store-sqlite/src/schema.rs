//! SQL schema for the vacation SQLite store.
//!
//! Executed once at connection startup, after the journal mode is switched to
//! WAL. `PRAGMA user_version` records the layout revision for future
//! migrations.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id        TEXT PRIMARY KEY,
    display_name      TEXT NOT NULL,
    contact_address   TEXT NOT NULL UNIQUE,
    login_code        TEXT NOT NULL UNIQUE
                      CHECK (length(login_code) = 7 AND login_code NOT GLOB '*[^0-9]*'),
    credential_digest TEXT NOT NULL,
    role              TEXT NOT NULL CHECK (role IN ('supervisor', 'subordinate')),
    created_at        TEXT NOT NULL    -- RFC 3339 UTC, fixed precision
);

CREATE TABLE IF NOT EXISTS vacation_requests (
    request_id   TEXT PRIMARY KEY,
    subject_id   TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    date_from    TEXT NOT NULL,    -- YYYY-MM-DD
    date_to      TEXT NOT NULL,
    reason       TEXT,
    status       TEXT NOT NULL DEFAULT 'pending'
                 CHECK (status IN ('pending', 'approved', 'rejected')),
    submitted_at TEXT NOT NULL,
    CHECK (date_to >= date_from)
);

-- candidate is the proposed address, or the escrowed password plaintext.
-- candidate_digest is set exactly for password proposals.
CREATE TABLE IF NOT EXISTS change_proposals (
    proposal_id      TEXT PRIMARY KEY,
    subject_id       TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    initiator_id     TEXT NOT NULL REFERENCES accounts(account_id) ON DELETE CASCADE,
    kind             TEXT NOT NULL CHECK (kind IN ('password', 'email')),
    candidate        TEXT NOT NULL,
    candidate_digest TEXT,
    status           TEXT NOT NULL DEFAULT 'pending'
                     CHECK (status IN ('pending', 'approved', 'rejected')),
    created_at       TEXT NOT NULL,
    decided_at       TEXT,
    CHECK ((kind = 'password') = (candidate_digest IS NOT NULL)),
    CHECK ((status = 'pending') = (decided_at IS NULL))
);

-- At most one pending proposal per (subject, kind).
CREATE UNIQUE INDEX IF NOT EXISTS change_proposals_one_pending
    ON change_proposals (subject_id, kind)
    WHERE status = 'pending';

CREATE INDEX IF NOT EXISTS vacation_requests_subject_idx
    ON vacation_requests (subject_id, submitted_at);
CREATE INDEX IF NOT EXISTS change_proposals_subject_idx
    ON change_proposals (subject_id, kind, created_at);
CREATE INDEX IF NOT EXISTS change_proposals_initiator_idx
    ON change_proposals (initiator_id);

PRAGMA user_version = 1;
";

#[cfg(test)]
mod tests {
  use super::SCHEMA;

  #[test]
  fn schema_is_valid_and_idempotent() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
  }
}
