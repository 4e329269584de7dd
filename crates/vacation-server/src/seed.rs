//! Demo accounts for a fresh database.

use vacation_core::{
  account::{LoginCode, NewAccount, Role},
  secret::SecretHasher,
  store::ApprovalStore,
};

use crate::error::{Error, Result};

pub const SEED_PASSWORD: &str = "Password1!";

const SEED_ACCOUNTS: &[(&str, &str, &str, Role)] = &[
  ("Maggie Manager", "maggie.manager@example.com", "1000001", Role::Supervisor),
  ("Ethan Employee", "ethan.employee@example.com", "2000001", Role::Subordinate),
];

/// Create one supervisor and one subordinate, skipping any whose login code
/// is already taken. Returns how many accounts were created.
pub async fn seed<S, H>(store: &S, hasher: &H) -> Result<usize>
where
  S: ApprovalStore,
  S::Error: Into<Error>,
  H: SecretHasher,
{
  let mut created = 0;
  for &(name, email, code, role) in SEED_ACCOUNTS {
    let login_code = LoginCode::parse(code)?;
    if store
      .credential_by_login_code(login_code.clone())
      .await
      .map_err(Into::<Error>::into)?
      .is_some()
    {
      tracing::info!(login_code = code, "seed account exists, skipping");
      continue;
    }

    let digest = hasher
      .digest(SEED_PASSWORD)
      .map_err(|e| Error::Hash(e.to_string()))?;
    let account = store
      .create_account(NewAccount {
        display_name:      name.to_owned(),
        contact_address:   email.to_owned(),
        login_code,
        credential_digest: digest,
        role,
      })
      .await
      .map_err(Into::<Error>::into)?;
    tracing::info!(account_id = %account.id, login_code = code, role = %role, "seeded account");
    created += 1;
  }
  Ok(created)
}
