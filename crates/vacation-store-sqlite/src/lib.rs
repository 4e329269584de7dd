//! SQLite backend for the vacation approval store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-statement transitions run inside
//! `BEGIN IMMEDIATE` transactions, which take the database write lock up
//! front and stand in for row locks.

mod accounts;
mod encode;
mod ledger;
mod proposals;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
