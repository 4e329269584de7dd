//! The `ApprovalStore` trait.
//!
//! Implemented by storage backends (e.g. `vacation-store-sqlite`). The
//! [`ApprovalEngine`](crate::engine::ApprovalEngine) depends on this
//! abstraction, not on any concrete backend.
//!
//! Every state transition is atomic: an implementation either applies all of
//! it or none of it. Outcomes that are not failures of the store itself, such
//! as "no pending row matched", are reported as `None` or `false` rather than
//! as errors.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountOverview, Credential, LoginCode, NewAccount},
  edit::AccountWrite,
  lifecycle::Decision,
  proposal::{DecidedProposal, PendingProposal, ProposalKind},
  vacation::{DecidedRequest, NewVacationRequest, RequestWithOwner, VacationRequest},
};

/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ApprovalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity store ────────────────────────────────────────────────────

  /// Persist a new account. Fails on a duplicate contact address or login
  /// code.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Every account, newest first, with its latest proposal of each kind.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<AccountOverview>, Self::Error>> + Send + '_;

  /// Delete an account and, by cascade, its requests and every proposal it
  /// is the subject or initiator of. Returns whether a row was removed.
  fn delete_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn credential(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  fn credential_by_login_code(
    &self,
    code: LoginCode,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + '_;

  /// Compare-and-swap the digest: succeeds only while the stored digest is
  /// still `expected`.
  fn replace_digest(
    &self,
    subject_id: Uuid,
    expected: String,
    next: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Lock `target`, apply the direct changes, and supersede-then-insert one
  /// pending proposal per payload, all in one transaction.
  ///
  /// Returns the new proposal ids in payload order, or `None` if the target
  /// does not exist.
  fn apply_account_write(
    &self,
    target: Uuid,
    initiator: Uuid,
    write: AccountWrite,
  ) -> impl Future<Output = Result<Option<Vec<Uuid>>, Self::Error>> + Send + '_;

  // ── Vacation ledger ───────────────────────────────────────────────────

  fn submit_request(
    &self,
    input: NewVacationRequest,
  ) -> impl Future<Output = Result<VacationRequest, Self::Error>> + Send + '_;

  /// Move a pending request to a terminal state. `None` if the request does
  /// not exist or is no longer pending.
  fn decide_request(
    &self,
    id: Uuid,
    decision: Decision,
  ) -> impl Future<Output = Result<Option<DecidedRequest>, Self::Error>> + Send + '_;

  /// Delete the request only if `owner` owns it and it is pending. Returns
  /// whether a row was removed.
  fn withdraw_request(
    &self,
    id: Uuid,
    owner: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One subject's requests, newest first.
  fn list_requests_for(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VacationRequest>, Self::Error>> + Send + '_;

  /// Every request with its owner, newest first.
  fn list_all_requests(
    &self,
  ) -> impl Future<Output = Result<Vec<RequestWithOwner>, Self::Error>> + Send + '_;

  // ── Change proposals ──────────────────────────────────────────────────

  /// The newest pending proposal of `kind` targeting `subject_id`.
  fn pending_proposal(
    &self,
    subject_id: Uuid,
    kind: ProposalKind,
  ) -> impl Future<Output = Result<Option<PendingProposal>, Self::Error>> + Send + '_;

  /// Lock the newest pending proposal of `kind` for `subject_id`, apply its
  /// payload on approval, and stamp the decision, in one transaction.
  /// `None` if nothing was pending.
  fn respond_to_proposal(
    &self,
    subject_id: Uuid,
    kind: ProposalKind,
    decision: Decision,
  ) -> impl Future<Output = Result<Option<DecidedProposal>, Self::Error>> + Send + '_;
}
