mod app;
mod bot;
mod domain;
mod infra;
mod util;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::util::config::Config;
use crate::util::version::{version_label, APP_NAME};

#[tokio::main]
async fn main() -> ExitCode {
    // A .env file is optional; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    info!(version = %version_label(), ?config, "starting {APP_NAME}");

    match app::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "bot stopped");
            ExitCode::FAILURE
        }
    }
}
