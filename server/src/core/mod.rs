//! Application core: CLI, configuration, and bootstrap

pub mod cli;
pub mod config;
pub mod constants;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::data::postgres::PostgresService;

use self::cli::Cli;
use self::config::AppConfig;

/// Application entrypoint: parse configuration, initialize the store, serve.
pub struct CoreApp;

impl CoreApp {
    pub async fn run() -> anyhow::Result<()> {
        dotenvy::dotenv().ok();
        let cli = Cli::parse();
        let config = AppConfig::from_cli(&cli);

        init_tracing(&config.log_filter);
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            host = %config.host,
            port = config.port,
            "starting tracegate"
        );

        let postgres = PostgresService::init(&config.postgres)
            .await
            .context("failed to initialize PostgreSQL")?;

        api::server::serve(&config, postgres.pool().clone()).await?;

        postgres.close().await;
        Ok(())
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
