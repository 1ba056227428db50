use std::sync::Arc;
use reputation_ledger_repository::{PostgresLedgerRepository, PostgresNotificationRepository, MIGRATOR};
use reputation_ledger_service::{Notifier, VoteLedger};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use crate::config::LedgerConfig;
use crate::errors::AppError;

/// `Dependencies` holds the services exposed to callers.
///
/// Both services share one PostgreSQL pool; the ledger and the notifier never
/// take part in the same transaction.
pub struct Dependencies {
    pub ledger: VoteLedger,
    pub notifier: Notifier,
    pub pool: sqlx::PgPool,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or an
    /// `AppError` if the configuration is incomplete or the database is unreachable.
    pub async fn new() -> Result<Self, AppError> {
        let config = LedgerConfig::from_env()?;
        Self::from_config(&config).await
    }

    /// Connects to PostgreSQL, applies pending migrations and wires the services.
    pub async fn from_config(config: &LedgerConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            max_retries = config.retry_policy.max_retries,
            "Initializing dependencies"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        MIGRATOR.run(&pool).await?;
        info!("Database migrations applied");

        let ledger_repository = PostgresLedgerRepository::new(pool.clone()).await?;
        let notification_repository = Arc::new(PostgresNotificationRepository::new(pool.clone()).await?);

        let ledger = VoteLedger::with_retry_policy(Arc::new(ledger_repository), config.retry_policy);
        let notifier = Notifier::new(notification_repository.clone(), notification_repository);

        Ok(Dependencies {
            ledger,
            notifier,
            pool,
        })
    }
}
