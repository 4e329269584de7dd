//! The approval engine: role checks, validation, and hashing in front of an
//! [`ApprovalStore`].
//!
//! Validation and authorization failures are raised before the store is
//! touched. Everything transactional happens inside a single store call, so
//! the engine itself holds no locks and keeps no state beyond its two
//! collaborators.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{Account, AccountOverview, CreateAccount, NewAccount, Role},
  edit::{
    self, AccountEdit, AccountWrite, EditField, EditOutcome, FieldStatus,
    PlannedEdit, ProposedValue,
  },
  identity::Identity,
  lifecycle::Decision,
  proposal::{
    DecidedProposal, PasswordEscrow, PendingProposal, ProposalKind,
    ProposalPayload, ResponseAction,
  },
  secret::{SecretHasher, validate_password},
  store::ApprovalStore,
  vacation::{
    DecidedRequest, RequestHistory, RequestWithOwner, SubmitRequest,
    VacationRequest,
  },
};

pub struct ApprovalEngine<S, H> {
  store:  S,
  hasher: H,
}

impl<S, H> ApprovalEngine<S, H>
where
  S: ApprovalStore,
  H: SecretHasher,
{
  pub fn new(store: S, hasher: H) -> Self { Self { store, hasher } }

  pub fn store(&self) -> &S { &self.store }

  pub fn hasher(&self) -> &H { &self.hasher }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// The caller's own account.
  pub async fn me(&self, who: &Identity) -> Result<Account> {
    self
      .store
      .get_account(who.subject_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound)
  }

  pub async fn create_account(
    &self,
    who: &Identity,
    input: CreateAccount,
  ) -> Result<Account> {
    who.require(Role::Supervisor)?;
    let valid = input.validate()?;
    let digest = self
      .hasher
      .digest(&valid.password)
      .map_err(Error::create_failed)?;

    let account = self
      .store
      .create_account(NewAccount {
        display_name:      valid.display_name,
        contact_address:   valid.contact_address,
        login_code:        valid.login_code,
        credential_digest: digest,
        role:              valid.role,
      })
      .await
      .map_err(|e| {
        warn!(error = %e, "account creation failed");
        Error::create_failed(e)
      })?;

    info!(account_id = %account.id, role = %account.role, by = %who.subject_id, "account created");
    Ok(account)
  }

  /// Delete `target` and everything hanging off it. Deleting an absent
  /// account is not an error.
  pub async fn delete_account(&self, who: &Identity, target: Uuid) -> Result<()> {
    who.require(Role::Supervisor)?;
    let removed = self
      .store
      .delete_account(target)
      .await
      .map_err(Error::update_failed)?;
    if removed {
      info!(account_id = %target, by = %who.subject_id, "account deleted");
    }
    Ok(())
  }

  pub async fn list_accounts(&self, who: &Identity) -> Result<Vec<AccountOverview>> {
    who.require(Role::Supervisor)?;
    self.store.list_accounts().await.map_err(Error::storage)
  }

  /// Edit `target`, writing directly or proposing per field.
  pub async fn update_account(
    &self,
    who: &Identity,
    target: Uuid,
    edit: AccountEdit,
  ) -> Result<EditOutcome> {
    who.require(Role::Supervisor)?;
    let planned = edit::plan(who, target, edit)?;

    let mut write = AccountWrite::default();
    let mut outcome = EditOutcome::default();
    for step in planned {
      match step {
        PlannedEdit::DirectEdit(EditField::Name(name)) => {
          write.direct.display_name = Some(name);
        }
        PlannedEdit::DirectEdit(EditField::Role(role)) => {
          write.direct.role = Some(role);
        }
        PlannedEdit::DirectEdit(EditField::Email(address)) => {
          write.direct.contact_address = Some(address);
          outcome.email_status = Some(FieldStatus::Updated);
        }
        PlannedEdit::DirectEdit(EditField::Password(plain)) => {
          let digest =
            self.hasher.digest(&plain).map_err(Error::update_failed)?;
          write.direct.credential_digest = Some(digest);
          outcome.password_status = Some(FieldStatus::Updated);
        }
        PlannedEdit::ProposedEdit(value) => {
          match value.kind() {
            ProposalKind::Password => {
              outcome.password_status = Some(FieldStatus::Pending);
            }
            ProposalKind::Email => {
              outcome.email_status = Some(FieldStatus::Pending);
            }
          }
          write.proposals.push(self.escrow(value)?);
        }
      }
    }

    outcome.proposal_ids = self
      .store
      .apply_account_write(target, who.subject_id, write)
      .await
      .map_err(|e| {
        warn!(error = %e, account_id = %target, "account update failed");
        Error::update_failed(e)
      })?
      .ok_or(Error::NotFound)?;

    info!(
      account_id = %target,
      by = %who.subject_id,
      password = ?outcome.password_status,
      email = ?outcome.email_status,
      "account updated"
    );
    Ok(outcome)
  }

  // ── Change proposals ──────────────────────────────────────────────────────

  /// Propose a credential change for someone else. Any undecided proposal of
  /// the same kind for `target` is superseded.
  pub async fn propose_change(
    &self,
    who: &Identity,
    target: Uuid,
    value: ProposedValue,
  ) -> Result<Uuid> {
    who.require(Role::Supervisor)?;
    if who.is(target) {
      return Err(Error::Forbidden);
    }
    let payload = self.escrow(value)?;
    let kind = payload.kind();

    let write = AccountWrite { proposals: vec![payload], ..Default::default() };
    let id = self
      .store
      .apply_account_write(target, who.subject_id, write)
      .await
      .map_err(|e| {
        warn!(error = %e, account_id = %target, %kind, "proposal failed");
        Error::update_failed(e)
      })?
      .and_then(|ids| ids.into_iter().next())
      .ok_or(Error::NotFound)?;

    info!(proposal_id = %id, account_id = %target, %kind, by = %who.subject_id, "change proposed");
    Ok(id)
  }

  /// The caller's outstanding proposal of `kind`, if any.
  pub async fn pending_proposal(
    &self,
    who: &Identity,
    kind: ProposalKind,
  ) -> Result<Option<PendingProposal>> {
    self
      .store
      .pending_proposal(who.subject_id, kind)
      .await
      .map_err(Error::storage)
  }

  /// Approve or reject the caller's outstanding proposal of `kind`.
  pub async fn respond_to_proposal(
    &self,
    who: &Identity,
    kind: ProposalKind,
    action: ResponseAction,
  ) -> Result<DecidedProposal> {
    let decided = self
      .store
      .respond_to_proposal(who.subject_id, kind, action.decision())
      .await
      .map_err(|e| {
        warn!(error = %e, account_id = %who.subject_id, %kind, "proposal response failed");
        Error::update_failed(e)
      })?
      .ok_or(Error::NoPendingUpdate)?;

    info!(proposal_id = %decided.id, %kind, status = %decided.status, "proposal decided");
    Ok(decided)
  }

  /// Self-service password change. No proposal: actor and target coincide.
  pub async fn change_own_password(
    &self,
    who: &Identity,
    current: &str,
    next: &str,
  ) -> Result<()> {
    let current = current.trim();
    if current.is_empty() || next.trim().is_empty() {
      return Err(Error::MissingFields);
    }
    let next = validate_password(next)?;

    let credential = self
      .store
      .credential(who.subject_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound)?;
    if !self.hasher.matches(current, &credential.digest) {
      return Err(Error::InvalidCurrentPassword);
    }

    let digest = self.hasher.digest(&next).map_err(Error::update_failed)?;
    let swapped = self
      .store
      .replace_digest(who.subject_id, credential.digest, digest)
      .await
      .map_err(Error::update_failed)?;
    if !swapped {
      // The digest moved between read and write.
      return Err(Error::InvalidCurrentPassword);
    }

    info!(account_id = %who.subject_id, "password changed");
    Ok(())
  }

  fn escrow(&self, value: ProposedValue) -> Result<ProposalPayload> {
    match value.validate()? {
      ProposedValue::Email(address) => Ok(ProposalPayload::Email { address }),
      ProposedValue::Password(plain) => {
        let digest = self.hasher.digest(&plain).map_err(Error::update_failed)?;
        Ok(ProposalPayload::Password(PasswordEscrow::new(plain, digest)))
      }
    }
  }

  // ── Vacation ledger ───────────────────────────────────────────────────────

  pub async fn submit_request(
    &self,
    who: &Identity,
    input: SubmitRequest,
  ) -> Result<VacationRequest> {
    who.require(Role::Subordinate)?;
    let new = input.validate(who.subject_id)?;
    let request = self
      .store
      .submit_request(new)
      .await
      .map_err(Error::create_failed)?;

    info!(request_id = %request.id, account_id = %who.subject_id, "vacation request submitted");
    Ok(request)
  }

  pub async fn decide_request(
    &self,
    who: &Identity,
    id: Uuid,
    decision: Decision,
  ) -> Result<DecidedRequest> {
    who.require(Role::Supervisor)?;
    let decided = self
      .store
      .decide_request(id, decision)
      .await
      .map_err(Error::update_failed)?
      .ok_or(Error::NotFoundOrNotPending)?;

    info!(request_id = %id, status = %decided.status, by = %who.subject_id, "vacation request decided");
    Ok(decided)
  }

  /// Withdraw one of the caller's own pending requests. Idempotent: absent,
  /// foreign, or already-decided requests are left alone without error.
  pub async fn withdraw_request(&self, who: &Identity, id: Uuid) -> Result<()> {
    who.require(Role::Subordinate)?;
    let removed = self
      .store
      .withdraw_request(id, who.subject_id)
      .await
      .map_err(Error::update_failed)?;
    if removed {
      info!(request_id = %id, account_id = %who.subject_id, "vacation request withdrawn");
    }
    Ok(())
  }

  pub async fn list_my_requests(&self, who: &Identity) -> Result<Vec<VacationRequest>> {
    self
      .store
      .list_requests_for(who.subject_id)
      .await
      .map_err(Error::storage)
  }

  pub async fn list_all_requests(&self, who: &Identity) -> Result<Vec<RequestWithOwner>> {
    who.require(Role::Supervisor)?;
    self.store.list_all_requests().await.map_err(Error::storage)
  }

  pub async fn request_history(
    &self,
    who: &Identity,
    target: Uuid,
  ) -> Result<RequestHistory> {
    who.require(Role::Supervisor)?;
    let account = self
      .store
      .get_account(target)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound)?;
    let requests = self
      .store
      .list_requests_for(target)
      .await
      .map_err(Error::storage)?;
    Ok(RequestHistory { account, requests })
  }
}
