//! Reputation Ledger Main Entry Point
//!
//! Connects to PostgreSQL, applies the ledger migrations and reports the
//! current reputation leaderboard.

use dotenv::dotenv;
use reputation_ledger::{AppError, Dependencies, LogFormat};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Number of accounts reported at startup.
const LEADERBOARD_SIZE: usize = 10;

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("reputation_ledger=info,reputation_ledger_service=info,reputation_ledger_repository=info")
    });

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init(),
    }

    info!(
        service_name = "reputation-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing(LogFormat::from_env());

    let dependencies = match Dependencies::new().await {
        Ok(dependencies) => {
            info!("Dependencies initialized successfully");
            dependencies
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let leaderboard = dependencies.ledger.leaderboard(LEADERBOARD_SIZE).await?;
    for (rank, account) in leaderboard.iter().enumerate() {
        info!(rank = rank + 1, user = %account.user_id, points = account.points, "Leaderboard");
    }

    dependencies.pool.close().await;
    Ok(())
}
