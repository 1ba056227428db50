use reputation_ledger_shared::types::{
    EventClass, NewNotification, NotificationId, NotificationPreferences, NotificationRecord,
    UserId,
};
use crate::errors::NotificationRepositoryError;

/// Storage for notification records.
///
/// Records are only ever created and marked read; they are never deleted or un-read.
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Creates an unread notification. The store assigns the id and a creation
    /// timestamp that is strictly increasing across inserts.
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationRecord, NotificationRepositoryError>;

    /// Lists all notifications of `recipient_id`, newest first.
    async fn list_notifications(
        &self,
        recipient_id: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationRepositoryError>;

    /// Counts the unread notifications of `recipient_id`.
    async fn count_unread(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Marks one notification of `recipient_id` as read.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The notification transitioned from unread to read
    /// * `Ok(false)` - The notification was already read
    /// * `Err(NotificationRepositoryError::NotFound)` - No such notification for this recipient
    async fn mark_read(
        &self,
        recipient_id: &UserId,
        id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Marks every unread notification of `recipient_id` as read and returns how many changed.
    async fn mark_all_read(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}

/// Storage for per-account notification opt-ins.
#[async_trait::async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn get_preferences(
        &self,
        user_id: &UserId,
    ) -> Result<NotificationPreferences, NotificationRepositoryError>;

    async fn set_preference(
        &self,
        user_id: &UserId,
        event_class: EventClass,
        enabled: bool,
    ) -> Result<(), NotificationRepositoryError>;
}
