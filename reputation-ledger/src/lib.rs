//! Reputation Ledger Library
//!
//! This library wires the vote ledger and the notification fan-out to their
//! PostgreSQL stores, including configuration management, error handling, and
//! dependency injection.

pub mod config;
pub mod errors;

pub use config::{Dependencies, LedgerConfig, LogFormat};
pub use errors::AppError;
