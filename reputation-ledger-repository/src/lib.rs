//! # Reputation Ledger Repository
//! This crate provides traits and implementations for the storage behind the vote ledger
//! and the notification fan-out. It includes definitions for errors, interfaces, an
//! in-memory versioned store and concrete implementations for PostgreSQL.
pub mod clock;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use clock::{Clock, SystemClock};
pub use errors::{LedgerRepositoryError, NotificationRepositoryError};
pub use interfaces::{CommitOutcome, LedgerRepository, NotificationRepository, PreferenceRepository};
pub use memory::{InMemoryLedgerRepository, InMemoryNotificationRepository};
pub use postgres::{PostgresLedgerRepository, PostgresNotificationRepository, MIGRATOR};
