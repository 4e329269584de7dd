//! Error type for the server's collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("argon2 error: {0}")]
  Hash(String),

  #[error(transparent)]
  Core(#[from] vacation_core::Error),

  #[error("store error: {0}")]
  Store(#[from] vacation_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
