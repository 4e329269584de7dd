//! Core types and the approval engine for the vacation portal.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::ApprovalStore`]; the binary supplies
//! a [`secret::SecretHasher`]; [`engine::ApprovalEngine`] ties them together.

pub mod account;
pub mod edit;
pub mod engine;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod proposal;
pub mod secret;
pub mod store;
pub mod vacation;

pub use engine::ApprovalEngine;
pub use error::{Error, Result};
