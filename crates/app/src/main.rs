mod cli;
mod config;
mod http;
mod services;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::wiring::WiringError;
use remark_infra::db::run_migrations;
use remark_infra::storage::Storage;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] remark_infra::db::DbPoolError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = config::AppConfig::from_env()?;
    let state = wiring::build_state(config)?;

    if let Some(pool) = state.storage.pool() {
        run_migrations(pool).await?;
    } else if !cli.mode.run_server() {
        return Err(AppError::InvalidCli(
            "migrate mode requires REMARK_STORAGE=postgres".to_string(),
        ));
    }
    if !cli.mode.run_server() {
        state.storage.close().await;
        info!("migrations applied; exiting");
        return Ok(());
    }

    let addr = state.config.http_addr;
    let http_state = state.clone();
    let mut api_task = tokio::spawn(async move {
        info!(%addr, "http server starting");
        http::serve(addr, http_state).await
    });

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
        res = &mut api_task => {
            res??;
            return Ok(());
        }
    }

    // Streams watch `shutdown`; the hub closes the rest so graceful shutdown
    // is not held open by idle SSE connections.
    state.shutdown.cancel();
    state.hub.shutdown().await;
    api_task.await??;
    state.storage.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
