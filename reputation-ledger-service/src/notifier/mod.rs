//! This module defines the `Notifier`, the best-effort fan-out invoked by content-authoring
//! operations (comment posted, answer added, vote cast), plus the read-state transitions
//! and preference management for the recipient's notification list.
use std::sync::Arc;
use reputation_ledger_repository::{NotificationRepository, PreferenceRepository};
use reputation_ledger_shared::types::{
    EventClass, NewNotification, NotificationId, NotificationPreferences, NotificationRecord,
    UserId,
};
use tracing::{debug, instrument, warn};
use crate::errors::NotifierError;

/// Creates notifications gated on recipient preferences.
pub struct Notifier {
    notifications: Arc<dyn NotificationRepository>,
    preferences: Arc<dyn PreferenceRepository>,
}

impl Notifier {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        preferences: Arc<dyn PreferenceRepository>,
    ) -> Self {
        Self {
            notifications,
            preferences,
        }
    }

    /// Notifies `recipient_id` about an event unless they opted out of `event_class`.
    ///
    /// Fire-and-forget: failures are logged and never reach the caller, so the
    /// triggering action succeeds regardless of delivery. Each call is one event and
    /// creates at most one record; it is never retried.
    #[instrument(skip(self, message, link))]
    pub async fn notify_if_enabled(
        &self,
        recipient_id: &UserId,
        event_class: EventClass,
        message: &str,
        link: &str,
    ) {
        match self.try_notify(recipient_id, event_class, message, link).await {
            Ok(Some(record)) => debug!(notification_id = %record.id, "Notification created"),
            Ok(None) => debug!("Notification suppressed by recipient preference"),
            Err(e) => warn!(error = %e, "Dropping notification"),
        }
    }

    /// Fallible core of `notify_if_enabled`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The notification was created
    /// * `Ok(None)` - The recipient disabled `event_class`
    /// * `Err(NotifierError)` - Preferences could not be read or the insert failed
    pub async fn try_notify(
        &self,
        recipient_id: &UserId,
        event_class: EventClass,
        message: &str,
        link: &str,
    ) -> Result<Option<NotificationRecord>, NotifierError> {
        let preferences = self
            .preferences
            .get_preferences(recipient_id)
            .await
            .map_err(NotifierError::PreferenceRead)?;
        if !preferences.allows(event_class) {
            return Ok(None);
        }

        let notification = NewNotification {
            recipient_id: recipient_id.clone(),
            event_class,
            message: message.to_string(),
            link: link.to_string(),
        };
        let record = self
            .notifications
            .insert_notification(&notification)
            .await
            .map_err(NotifierError::NotificationWriteFailed)?;
        Ok(Some(record))
    }

    /// All notifications of `recipient_id`, newest first.
    pub async fn notifications(&self, recipient_id: &UserId) -> Result<Vec<NotificationRecord>, NotifierError> {
        Ok(self.notifications.list_notifications(recipient_id).await?)
    }

    pub async fn unread_count(&self, recipient_id: &UserId) -> Result<u64, NotifierError> {
        Ok(self.notifications.count_unread(recipient_id).await?)
    }

    /// Moves one notification to Read. Returns `false` if it was already read.
    pub async fn mark_read(&self, recipient_id: &UserId, id: NotificationId) -> Result<bool, NotifierError> {
        Ok(self.notifications.mark_read(recipient_id, id).await?)
    }

    /// Moves every unread notification of `recipient_id` to Read.
    pub async fn mark_all_read(&self, recipient_id: &UserId) -> Result<u64, NotifierError> {
        let transitioned = self.notifications.mark_all_read(recipient_id).await?;
        debug!(recipient = %recipient_id, transitioned, "Marked notifications as read");
        Ok(transitioned)
    }

    pub async fn preferences(&self, user_id: &UserId) -> Result<NotificationPreferences, NotifierError> {
        Ok(self.preferences.get_preferences(user_id).await?)
    }

    pub async fn set_preference(
        &self,
        user_id: &UserId,
        event_class: EventClass,
        enabled: bool,
    ) -> Result<(), NotifierError> {
        Ok(self.preferences.set_preference(user_id, event_class, enabled).await?)
    }
}
