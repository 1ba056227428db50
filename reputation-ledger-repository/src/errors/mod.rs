//! Error types for the reputation ledger repository.
//! Consolidates and re-exports error types related to ledger and notification storage.
mod ledger;
mod notifications;

pub use ledger::LedgerRepositoryError;
pub use notifications::NotificationRepositoryError;
