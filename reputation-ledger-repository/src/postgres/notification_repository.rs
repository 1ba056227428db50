//! PostgreSQL implementation of the notification and preference repositories.
//!
//! ## Database Tables
//!
//! - `notifications`: One row per notification; `created_at` is assigned by the server
//! - `notification_preferences`: Explicit opt-in flags per (user, event class)
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reputation_ledger_shared::types::{
    EventClass, NewNotification, NotificationId, NotificationPreferences, NotificationRecord,
    UserId,
};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;
use crate::{NotificationRepository, NotificationRepositoryError, PreferenceRepository};

/// PostgreSQL implementation of `NotificationRepository` and `PreferenceRepository`.
pub struct PostgresNotificationRepository {
    pool: sqlx::PgPool,
}

impl PostgresNotificationRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the notification schema applied
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, NotificationRepositoryError> {
        Ok(Self { pool })
    }

    fn parse_event_class(raw: String) -> Result<EventClass, NotificationRepositoryError> {
        raw.parse::<EventClass>()
            .map_err(NotificationRepositoryError::InvalidEventClass)
    }

    fn record_from_row(row: PgRow) -> Result<NotificationRecord, NotificationRepositoryError> {
        let recipient_id: String = row.try_get("recipient_id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(NotificationRecord {
            id: row.try_get("id")?,
            recipient_id: UserId::new(recipient_id),
            event_class: Self::parse_event_class(row.try_get("event_class")?)?,
            message: row.try_get("message")?,
            link: row.try_get("link")?,
            is_read: row.try_get("is_read")?,
            created_at,
        })
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    /// Inserts an unread notification; `clock_timestamp()` provides the creation time.
    async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationRecord, NotificationRepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, event_class, message, link, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, clock_timestamp())
            RETURNING id, recipient_id, event_class, message, link, is_read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.recipient_id.as_str())
        .bind(notification.event_class.as_str())
        .bind(&notification.message)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await?;

        Self::record_from_row(row)
    }

    async fn list_notifications(
        &self,
        recipient_id: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, recipient_id, event_class, message, link, is_read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::record_from_row).collect()
    }

    async fn count_unread(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn mark_read(
        &self,
        recipient_id: &UserId,
        id: NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let transitioned = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2 AND NOT is_read",
        )
        .bind(id)
        .bind(recipient_id.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if transitioned == 1 {
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE id = $1 AND recipient_id = $2)",
        )
        .bind(id)
        .bind(recipient_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Ok(false)
        } else {
            Err(NotificationRepositoryError::NotFound(id))
        }
    }

    async fn mark_all_read(&self, recipient_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let transitioned = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(transitioned)
    }
}

#[async_trait]
impl PreferenceRepository for PostgresNotificationRepository {
    async fn get_preferences(
        &self,
        user_id: &UserId,
    ) -> Result<NotificationPreferences, NotificationRepositoryError> {
        let rows = sqlx::query(
            "SELECT event_class, enabled FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut preferences = NotificationPreferences::new();
        for row in rows {
            let event_class = Self::parse_event_class(row.try_get("event_class")?)?;
            preferences.set(event_class, row.try_get("enabled")?);
        }
        Ok(preferences)
    }

    async fn set_preference(
        &self,
        user_id: &UserId,
        event_class: EventClass,
        enabled: bool,
    ) -> Result<(), NotificationRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO notification_preferences (user_id, event_class, enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, event_class)
            DO UPDATE SET enabled = EXCLUDED.enabled
            "#,
        )
        .bind(user_id.as_str())
        .bind(event_class.as_str())
        .bind(enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
