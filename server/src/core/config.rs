//! Runtime configuration assembled from CLI flags and environment

use super::cli::Cli;

/// PostgreSQL connection settings
///
/// Values of 0 fall back to the defaults in `core::constants` when the pool
/// is initialized.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub statement_timeout_secs: u64,
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub postgres: PostgresConfig,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            log_filter: cli.log.clone(),
            postgres: PostgresConfig {
                url: cli.database_url.clone(),
                max_connections: cli.pg_max_connections,
                min_connections: cli.pg_min_connections,
                acquire_timeout_secs: 0,
                idle_timeout_secs: 0,
                max_lifetime_secs: 0,
                statement_timeout_secs: cli.pg_statement_timeout_secs,
            },
        }
    }
}
