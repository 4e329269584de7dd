//! [`SqliteStore`]: the SQLite implementation of [`ApprovalStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{Transaction, TransactionBehavior};
use uuid::Uuid;

use vacation_core::{
  account::{Account, AccountOverview, Credential, LoginCode, NewAccount},
  edit::AccountWrite,
  lifecycle::{Decision, Status},
  proposal::{ChangeProposal, DecidedProposal, PendingProposal, ProposalKind},
  store::ApprovalStore,
  vacation::{DecidedRequest, NewVacationRequest, RequestWithOwner, VacationRequest},
};

use crate::{
  Result,
  accounts::{self, AccountRow, DirectRow},
  encode::{decode_uuid, encode_dt, encode_kind, encode_status, encode_uuid},
  ledger::{self, RequestRow},
  proposals::{self, ProposalRow},
  schema::SCHEMA,
};

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An approval store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Separate
/// [`SqliteStore::open`] calls on the same path get separate connections that
/// contend for the database write lock.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(true).await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(false).await?;
    Ok(store)
  }

  async fn init_schema(&self, wal: bool) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        if wal {
          let mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            "WAL",
            |row| row.get(0),
          )?;
          tracing::debug!(journal_mode = %mode, "sqlite journal mode");
        }
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a `BEGIN IMMEDIATE` transaction and commit if it
  /// succeeds. An error from `f` rolls everything back.
  async fn in_transaction<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
      })
      .await?;
    Ok(out)
  }
}

// ─── ApprovalStore impl ──────────────────────────────────────────────────────

impl ApprovalStore for SqliteStore {
  type Error = crate::Error;

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      id:              Uuid::new_v4(),
      display_name:    input.display_name.clone(),
      contact_address: input.contact_address.clone(),
      login_code:      input.login_code.clone(),
      role:            input.role,
      created_at:      Utc::now(),
    };
    let row = AccountRow::new(&account, input);

    self
      .conn
      .call(move |conn| {
        accounts::insert(conn, &row)?;
        Ok(())
      })
      .await?;
    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(accounts::fetch(conn, &id_str)?))
      .await?;
    raw.map(|r| r.into_account()).transpose()
  }

  async fn list_accounts(&self) -> Result<Vec<AccountOverview>> {
    let raws = self
      .conn
      .call(|conn| Ok(accounts::list_overviews(conn)?))
      .await?;
    raws.into_iter().map(|r| r.into_overview()).collect()
  }

  async fn delete_account(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(accounts::delete(conn, &id_str)?))
      .await?;
    Ok(removed)
  }

  async fn credential(&self, id: Uuid) -> Result<Option<Credential>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(accounts::credential_by_id(conn, &id_str)?))
      .await?;
    raw.map(|r| r.into_credential()).transpose()
  }

  async fn credential_by_login_code(&self, code: LoginCode) -> Result<Option<Credential>> {
    let raw = self
      .conn
      .call(move |conn| Ok(accounts::credential_by_login_code(conn, code.as_str())?))
      .await?;
    raw.map(|r| r.into_credential()).transpose()
  }

  async fn replace_digest(
    &self,
    subject_id: Uuid,
    expected: String,
    next: String,
  ) -> Result<bool> {
    let id_str = encode_uuid(subject_id);
    let swapped = self
      .conn
      .call(move |conn| Ok(accounts::replace_digest(conn, &id_str, &expected, &next)?))
      .await?;
    Ok(swapped)
  }

  async fn apply_account_write(
    &self,
    target: Uuid,
    initiator: Uuid,
    write: AccountWrite,
  ) -> Result<Option<Vec<Uuid>>> {
    let now = Utc::now();
    let staged = write
      .proposals
      .into_iter()
      .map(|payload| ChangeProposal {
        id: Uuid::new_v4(),
        subject_id: target,
        initiator_id: initiator,
        payload,
        status: Status::Pending,
        created_at: now,
        decided_at: None,
      })
      .collect::<Vec<_>>();
    let ids = staged.iter().map(|p| p.id).collect::<Vec<_>>();
    let rows = staged.iter().map(ProposalRow::from).collect::<Vec<_>>();
    let direct = DirectRow::from(write.direct);
    let target_str = encode_uuid(target);

    let applied = self
      .in_transaction(move |tx| {
        if !accounts::lock_target(tx, &target_str)? {
          return Ok(false);
        }
        accounts::apply_direct(tx, &target_str, &direct)?;
        for row in &rows {
          proposals::supersede_pending(tx, &row.subject_id, row.kind)?;
          proposals::insert(tx, row)?;
        }
        Ok(true)
      })
      .await?;

    Ok(applied.then_some(ids))
  }

  async fn submit_request(&self, input: NewVacationRequest) -> Result<VacationRequest> {
    let request = VacationRequest {
      id:           Uuid::new_v4(),
      subject_id:   input.subject_id,
      date_from:    input.date_from,
      date_to:      input.date_to,
      reason:       input.reason,
      status:       Status::Pending,
      submitted_at: Utc::now(),
    };
    let row = RequestRow::from(&request);

    self
      .conn
      .call(move |conn| {
        ledger::insert(conn, &row)?;
        Ok(())
      })
      .await?;
    Ok(request)
  }

  async fn decide_request(
    &self,
    id: Uuid,
    decision: Decision,
  ) -> Result<Option<DecidedRequest>> {
    let id_str = encode_uuid(id);
    let status = decision.status();
    let status_str = encode_status(status);

    let moved = self
      .conn
      .call(move |conn| Ok(ledger::decide(conn, &id_str, status_str)?))
      .await?;
    Ok(moved.then_some(DecidedRequest { id, status }))
  }

  async fn withdraw_request(&self, id: Uuid, owner: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let owner_str = encode_uuid(owner);
    let removed = self
      .conn
      .call(move |conn| Ok(ledger::withdraw(conn, &id_str, &owner_str)?))
      .await?;
    Ok(removed)
  }

  async fn list_requests_for(&self, subject_id: Uuid) -> Result<Vec<VacationRequest>> {
    let id_str = encode_uuid(subject_id);
    let raws = self
      .conn
      .call(move |conn| Ok(ledger::list_for(conn, &id_str)?))
      .await?;
    raws.into_iter().map(|r| r.into_request()).collect()
  }

  async fn list_all_requests(&self) -> Result<Vec<RequestWithOwner>> {
    let raws = self
      .conn
      .call(|conn| Ok(ledger::list_all(conn)?))
      .await?;
    raws.into_iter().map(|r| r.into_request_with_owner()).collect()
  }

  async fn pending_proposal(
    &self,
    subject_id: Uuid,
    kind: ProposalKind,
  ) -> Result<Option<PendingProposal>> {
    let id_str = encode_uuid(subject_id);
    let kind_str = encode_kind(kind);
    let raw = self
      .conn
      .call(move |conn| Ok(proposals::pending_view(conn, &id_str, kind_str)?))
      .await?;
    raw.map(|r| r.into_pending()).transpose()
  }

  async fn respond_to_proposal(
    &self,
    subject_id: Uuid,
    kind: ProposalKind,
    decision: Decision,
  ) -> Result<Option<DecidedProposal>> {
    let subject_str = encode_uuid(subject_id);
    let kind_str = encode_kind(kind);
    let status = decision.status();
    let status_str = encode_status(status);
    let decided_at = Utc::now();
    let decided_at_str = encode_dt(decided_at);

    let id = self
      .in_transaction(move |tx| {
        proposals::respond(tx, &subject_str, kind_str, status_str, &decided_at_str)
      })
      .await?;

    id.map(|id| {
      Ok(DecidedProposal {
        id: decode_uuid(&id)?,
        kind,
        status,
        decided_at,
      })
    })
    .transpose()
  }
}
