use thiserror::Error;
use reputation_ledger_shared::types::NotificationId;

/// Represents errors that can occur within the notification and preference repositories.
#[derive(Debug, Error)]
pub enum NotificationRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid event class: {0}")]
    InvalidEventClass(String),

    #[error("Notification not found: {0}")]
    NotFound(NotificationId),
}
