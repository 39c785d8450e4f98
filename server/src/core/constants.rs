//! Compile-time defaults shared across the server.

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4319;
pub const DEFAULT_LOG_FILTER: &str = "info";

// PostgreSQL pool defaults, applied when the corresponding config value is 0.
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 2;
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;
