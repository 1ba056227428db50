//! Error types for the notifier.
//! `NotificationWriteFailed` and `PreferenceRead` are only observable through
//! `Notifier::try_notify`; `notify_if_enabled` logs and swallows them.
use thiserror::Error;
use reputation_ledger_repository::NotificationRepositoryError;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Notification write failed: {0}")]
    NotificationWriteFailed(#[source] NotificationRepositoryError),
    #[error("Could not read notification preferences: {0}")]
    PreferenceRead(#[source] NotificationRepositoryError),
    #[error("Notification repository error: {0}")]
    Repository(#[from] NotificationRepositoryError),
}
