//! Integration tests for the PostgreSQL notification repository implementation.
//!
//! Run with: `cargo test -p reputation-ledger-repository --features postgres-tests --test postgres_notifications`
#![cfg(feature = "postgres-tests")]

use reputation_ledger_repository::{
    NotificationRepository, NotificationRepositoryError, PostgresNotificationRepository,
    PreferenceRepository,
};
use reputation_ledger_shared::types::{EventClass, NewNotification, UserId};

fn make_notification(recipient: &str, message: &str) -> NewNotification {
    NewNotification {
        recipient_id: UserId::from(recipient),
        event_class: EventClass::Answer,
        message: message.to_string(),
        link: "/questions/q-42".to_string(),
    }
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_insert_and_list_newest_first(pool: sqlx::PgPool) {
    let repository = PostgresNotificationRepository::new(pool.clone()).await.unwrap();

    let first = repository.insert_notification(&make_notification("ana", "first")).await.unwrap();
    let second = repository.insert_notification(&make_notification("ana", "second")).await.unwrap();
    repository.insert_notification(&make_notification("ben", "other")).await.unwrap();

    assert!(!first.is_read);
    assert!(second.created_at > first.created_at);

    let listed = repository.list_notifications(&UserId::from("ana")).await.unwrap();
    let messages: Vec<&str> = listed.iter().map(|record| record.message.as_str()).collect();
    assert_eq!(messages, vec!["second", "first"]);
    assert_eq!(repository.count_unread(&UserId::from("ana")).await.unwrap(), 2);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_mark_read_transitions_once(pool: sqlx::PgPool) {
    let repository = PostgresNotificationRepository::new(pool.clone()).await.unwrap();
    let ana = UserId::from("ana");
    let record = repository.insert_notification(&make_notification("ana", "hello")).await.unwrap();

    assert!(repository.mark_read(&ana, record.id).await.unwrap());
    assert!(!repository.mark_read(&ana, record.id).await.unwrap());

    let foreign = repository.mark_read(&UserId::from("ben"), record.id).await;
    assert!(matches!(foreign, Err(NotificationRepositoryError::NotFound(_))));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_mark_all_read(pool: sqlx::PgPool) {
    let repository = PostgresNotificationRepository::new(pool.clone()).await.unwrap();
    let ana = UserId::from("ana");
    for message in ["a", "b", "c"] {
        repository.insert_notification(&make_notification("ana", message)).await.unwrap();
    }

    assert_eq!(repository.mark_all_read(&ana).await.unwrap(), 3);
    assert_eq!(repository.mark_all_read(&ana).await.unwrap(), 0);
    assert_eq!(repository.count_unread(&ana).await.unwrap(), 0);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_preferences_upsert(pool: sqlx::PgPool) {
    let repository = PostgresNotificationRepository::new(pool.clone()).await.unwrap();
    let ana = UserId::from("ana");

    assert!(repository.get_preferences(&ana).await.unwrap().allows(EventClass::Comment));

    repository.set_preference(&ana, EventClass::Comment, false).await.unwrap();
    assert!(!repository.get_preferences(&ana).await.unwrap().allows(EventClass::Comment));

    repository.set_preference(&ana, EventClass::Comment, true).await.unwrap();
    assert!(repository.get_preferences(&ana).await.unwrap().allows(EventClass::Comment));
}
