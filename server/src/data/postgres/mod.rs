//! PostgreSQL database service
//!
//! Centralized pool management for the single relational backend:
//! - Connection pooling with min/max bounds
//! - Idle connection cleanup and lifetime cycling
//! - Statement timeout protection
//!
//! All schema definitions and migrations are managed here.

mod migrations;
pub mod repositories;
pub mod schema;

pub use sqlx::PgPool;

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::PostgresConfig;
use crate::core::constants::{
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_MAX_LIFETIME_SECS,
    POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};
use crate::data::error::DataError;

fn or_default<T: PartialEq + Default>(value: T, default: T) -> T {
    if value == T::default() { default } else { value }
}

/// PostgreSQL database service
///
/// Handles pool initialization and migrations. Created once at server
/// startup and shared across all modules.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    /// Initialize the database service from configuration
    pub async fn init(config: &PostgresConfig) -> Result<Self, DataError> {
        if config.url.is_empty() {
            return Err(DataError::Config("PostgreSQL URL is required".into()));
        }

        let max_connections = or_default(config.max_connections, POSTGRES_DEFAULT_MAX_CONNECTIONS);
        let min_connections = or_default(config.min_connections, POSTGRES_DEFAULT_MIN_CONNECTIONS);
        let acquire_timeout = or_default(
            config.acquire_timeout_secs,
            POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
        );
        let idle_timeout = or_default(config.idle_timeout_secs, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS);
        let max_lifetime = or_default(config.max_lifetime_secs, POSTGRES_DEFAULT_MAX_LIFETIME_SECS);
        let statement_timeout = or_default(
            config.statement_timeout_secs,
            POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
        );

        let mut options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e| DataError::Config(format!("Invalid PostgreSQL URL: {}", e)))?;

        options = options.log_statements(LevelFilter::Trace);

        // Statement timeout bounds both runaway queries and quota row-lock waits.
        if statement_timeout > 0 {
            options = options.options([("statement_timeout", format!("{}s", statement_timeout))]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(
            max_connections,
            min_connections,
            acquire_timeout_secs = acquire_timeout,
            idle_timeout_secs = idle_timeout,
            max_lifetime_secs = max_lifetime,
            statement_timeout_secs = statement_timeout,
            "PostgresService initialized"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_default_resolution() {
        assert_eq!(or_default(0_u32, 20), 20);
        assert_eq!(or_default(5_u32, 20), 5);
        assert_eq!(or_default(0_u64, 30), 30);
    }
}
