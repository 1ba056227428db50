//! PostgreSQL implementations of the ledger and notification repositories.
mod ledger_repository;
mod notification_repository;

pub use ledger_repository::PostgresLedgerRepository;
pub use notification_repository::PostgresNotificationRepository;

/// Schema migrations for every table used by the PostgreSQL repositories.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");

/// Returns true when `error` means a concurrent transaction got there first.
///
/// Covers serialization failures, deadlocks and unique violations raised by
/// insert-if-absent writes racing each other.
pub(crate) fn is_write_conflict(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            matches!(db_error.code().as_deref(), Some("40001") | Some("40P01") | Some("23505"))
        }
        _ => false,
    }
}
