use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reputation_ledger_shared::types::{
    EventClass, NewNotification, NotificationId, NotificationPreferences, NotificationRecord,
    UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use crate::{Clock, NotificationRepository, NotificationRepositoryError, PreferenceRepository, SystemClock};

#[derive(Debug, Default)]
struct NotificationState {
    notifications: Vec<NotificationRecord>,
    preferences: HashMap<UserId, NotificationPreferences>,
    last_created_at: Option<DateTime<Utc>>,
}

/// In-memory notification and preference store.
///
/// Creation timestamps come from the configured `Clock` but are bumped by one
/// microsecond whenever the clock has not advanced past the previous insert.
pub struct InMemoryNotificationRepository {
    clock: Arc<dyn Clock>,
    state: Mutex<NotificationState>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(NotificationState::default()),
        }
    }
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationRecord, NotificationRepositoryError> {
        let mut state = self.state.lock().await;

        let now = self.clock.now();
        let created_at = match state.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        state.last_created_at = Some(created_at);

        let record = NotificationRecord {
            id: Uuid::new_v4(),
            recipient_id: notification.recipient_id.clone(),
            event_class: notification.event_class,
            message: notification.message.clone(),
            link: notification.link.clone(),
            is_read: false,
            created_at,
        };
        state.notifications.push(record.clone());
        Ok(record)
    }

    async fn list_notifications(
        &self,
        recipient_id: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationRepositoryError> {
        let state = self.state.lock().await;
        let mut records: Vec<NotificationRecord> = state
            .notifications
            .iter()
            .filter(|record| &record.recipient_id == recipient_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn count_unread(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .iter()
            .filter(|record| &record.recipient_id == recipient_id && !record.is_read)
            .count() as u64)
    }

    async fn mark_read(
        &self,
        recipient_id: &UserId,
        id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut state = self.state.lock().await;
        let record = state
            .notifications
            .iter_mut()
            .find(|record| record.id == id && &record.recipient_id == recipient_id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;

        let transitioned = !record.is_read;
        record.is_read = true;
        Ok(transitioned)
    }

    async fn mark_all_read(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.state.lock().await;
        let mut transitioned = 0;
        for record in state
            .notifications
            .iter_mut()
            .filter(|record| &record.recipient_id == recipient_id && !record.is_read)
        {
            record.is_read = true;
            transitioned += 1;
        }
        Ok(transitioned)
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryNotificationRepository {
    async fn get_preferences(
        &self,
        user_id: &UserId,
    ) -> Result<NotificationPreferences, NotificationRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.preferences.get(user_id).cloned().unwrap_or_default())
    }

    async fn set_preference(
        &self,
        user_id: &UserId,
        event_class: EventClass,
        enabled: bool,
    ) -> Result<(), NotificationRepositoryError> {
        let mut state = self.state.lock().await;
        state
            .preferences
            .entry(user_id.clone())
            .or_default()
            .set(event_class, enabled);
        Ok(())
    }
}
