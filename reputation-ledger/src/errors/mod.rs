//! Error types for the Reputation Ledger application.
//! Consolidates the errors that can occur while configuring the service, connecting
//! to the database and serving ledger operations.
use reputation_ledger_repository::{LedgerRepositoryError, NotificationRepositoryError};
use reputation_ledger_service::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Ledger repository error: {0}")]
    LedgerRepository(#[from] LedgerRepositoryError),
    #[error("Notification repository error: {0}")]
    NotificationRepository(#[from] NotificationRepositoryError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
