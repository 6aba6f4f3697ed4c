//! FinaTech payments server
//!
//! An HTTP API over banking data:
//! - Payments between accounts, created together with unknown accounts in one transaction
//! - Accounts with postal addresses, matched by IBAN, BIC and account number
//! - Banks with the accounts registered under their BIC
//! - Keyword search and paging on every listing
//!
//! Storage is PostgreSQL by default, with an in-memory backend for tests
//! and local development.

#![allow(
    clippy::large_enum_variant, // sqlx::Error dominates the error enum size
)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
