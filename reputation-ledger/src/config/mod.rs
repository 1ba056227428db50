//! Configuration module for the Reputation Ledger.
//! Defines and manages application-wide settings and dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LedgerConfig, LogFormat};
