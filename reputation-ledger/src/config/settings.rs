//! Settings read from the process environment.
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use reputation_ledger_service::RetryPolicy;
use tracing::warn;
use crate::errors::AppError;

/// Default retry budget for a contended vote.
const DEFAULT_MAX_RETRIES: u32 = 16;

/// Default delay before the first retry, in milliseconds.
const DEFAULT_RETRY_BASE_MS: u64 = 5;

/// Default ceiling on a single retry delay, in milliseconds.
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 250;

/// Default PostgreSQL pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shipping.
    Json,
    /// Human-readable console output.
    Pretty,
}

impl LogFormat {
    /// Parse the log format from `LOG_FORMAT`.
    ///
    /// Valid values: "json" or "pretty" (case-insensitive).
    /// Defaults to "pretty" if not set or invalid.
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Runtime settings of the ledger service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub retry_policy: RetryPolicy,
}

impl LedgerConfig {
    /// Reads the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `LEDGER_MAX_RETRIES`: Retries after a conflicting vote commit (default: 16)
    /// - `LEDGER_RETRY_BASE_MS`: Delay before the first retry (default: 5)
    /// - `LEDGER_RETRY_MAX_DELAY_MS`: Ceiling on a single retry delay (default: 250)
    ///
    /// Invalid numeric values fall back to their defaults with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(LedgerConfig)` - The parsed configuration
    /// * `Err(AppError)` - If `DATABASE_URL` is not set
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::config("DATABASE_URL must be set"))?;

        let max_connections = parse_or_default("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let max_retries = parse_or_default("LEDGER_MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let base_delay = parse_or_default("LEDGER_RETRY_BASE_MS", DEFAULT_RETRY_BASE_MS);
        let max_delay = parse_or_default("LEDGER_RETRY_MAX_DELAY_MS", DEFAULT_RETRY_MAX_DELAY_MS);

        Ok(Self {
            database_url,
            max_connections,
            retry_policy: RetryPolicy::new(
                max_retries,
                Duration::from_millis(base_delay),
                Duration::from_millis(max_delay),
            ),
        })
    }
}

fn parse_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match env::var(name) {
        Err(_) => default,
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
                default
            }
        },
    }
}
