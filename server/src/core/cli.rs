//! Command line interface definition

use clap::Parser;

use super::constants::{DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(
    name = "tracegate",
    version,
    about = "Multi-tenant OTLP telemetry ingestion server"
)]
pub struct Cli {
    /// Address to bind the HTTP server on
    #[arg(long, env = "TRACEGATE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the HTTP server on
    #[arg(long, env = "TRACEGATE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum PostgreSQL pool connections (0 = built-in default)
    #[arg(long, env = "TRACEGATE_PG_MAX_CONNECTIONS", default_value_t = 0)]
    pub pg_max_connections: u32,

    /// Minimum PostgreSQL pool connections kept warm (0 = built-in default)
    #[arg(long, env = "TRACEGATE_PG_MIN_CONNECTIONS", default_value_t = 0)]
    pub pg_min_connections: u32,

    /// Statement timeout in seconds for runaway query protection (0 = built-in default)
    #[arg(long, env = "TRACEGATE_PG_STATEMENT_TIMEOUT_SECS", default_value_t = 0)]
    pub pg_statement_timeout_secs: u64,

    /// Log filter directive (RUST_LOG takes precedence when set)
    #[arg(long, env = "TRACEGATE_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log: String,
}
