use serenity::all::GatewayIntents;
use serenity::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::bot::Handler;
use crate::infra::keepalive;
use crate::infra::torn::{ClientBuildError, TornClient};
use crate::util::config::Config;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to build Torn API client: {0}")]
    Torn(#[from] ClientBuildError),
    #[error("failed to bind liveness endpoint: {0}")]
    Bind(#[from] std::io::Error),
    #[error("discord client error: {0}")]
    Discord(#[from] serenity::Error),
}

/// Run the liveness endpoint and the Discord client until the client stops.
pub async fn run(config: Config) -> Result<(), AppError> {
    let torn = TornClient::new(&config.torn_base_url, &config.foreign_stock_url)?
        .with_max_attempts(config.max_attempts);

    if config.torn_api_key.is_none() {
        info!("TORN_API_KEY not set; live commands need a key option");
    }

    let listener = keepalive::bind(config.port).await?;
    tokio::spawn(async move {
        if let Err(error) = keepalive::serve(listener).await {
            error!(%error, "liveness endpoint stopped");
        }
    });

    let handler = Handler::new(torn, &config);
    let mut client = Client::builder(&config.discord_token, GatewayIntents::non_privileged())
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}
