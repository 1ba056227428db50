//! In-memory repositories.
//!
//! Used by tests and by embedders that do not need durability. They implement the
//! same optimistic-versioning contract as the PostgreSQL repositories.
mod ledger_repository;
mod notification_repository;

pub use ledger_repository::InMemoryLedgerRepository;
pub use notification_repository::InMemoryNotificationRepository;
