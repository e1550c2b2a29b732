//! Discord front-end: command registration and dispatch.

pub mod commands;
pub mod render;

use serenity::all::{
    Command, CommandInteraction, Context, CreateAllowedMentions, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse, EventHandler, Interaction, Ready,
};
use serenity::async_trait;
use tracing::{error, info, warn};

use crate::domain::{attach_stock, catalog, ProfitView};
use crate::infra::torn::{TornClient, TornError, Transport};
use crate::util::config::Config;

use self::commands::{string_option, BotCommand, LiveCommand, LookupCommand};
use self::render::{
    format_report, render_category, render_country, render_error, render_net_worth, render_stocks,
    render_travel, MISSING_KEY,
};

const CANT_HANDLE: &str = "That command can't be handled by this version of the bot. \
Please try again after the commands have refreshed.";

pub struct Handler {
    torn: TornClient,
    default_key: Option<String>,
    flyprofits: ProfitView,
    flystock: ProfitView,
}

impl Handler {
    pub fn new(torn: TornClient, config: &Config) -> Self {
        Self {
            torn,
            default_key: config.torn_api_key.clone(),
            flyprofits: ProfitView::top_profits(config.flyprofits_min_profit),
            flystock: ProfitView::stock_by_country(config.flystock_min_profit),
        }
    }

    async fn dispatch(&self, ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
        let Some(kind) = BotCommand::from_name(&command.data.name) else {
            warn!(command = %command.data.name, "unknown command");
            return command
                .create_response(ctx, make_resp(CANT_HANDLE, false))
                .await;
        };

        match kind {
            BotCommand::Lookup(LookupCommand::Category(category)) => {
                command
                    .create_response(ctx, make_resp(&render_category(category), false))
                    .await
            }
            BotCommand::Lookup(LookupCommand::Country) => {
                let name = string_option(&command.data.options, "name")
                    .unwrap_or_default();
                command
                    .create_response(ctx, make_resp(&render_country(name), false))
                    .await
            }
            BotCommand::Live(live) => self.run_live(ctx, command, live).await,
        }
    }

    async fn run_live(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        live: LiveCommand,
    ) -> serenity::Result<()> {
        let supplied = string_option(&command.data.options, "key");
        let Some(key) = supplied.or(self.default_key.as_deref()) else {
            return command
                .create_response(ctx, make_resp(MISSING_KEY, true))
                .await;
        };

        // The backoff path can outlast Discord's initial reply window.
        if supplied.is_some() {
            command.defer_ephemeral(ctx).await?;
        } else {
            command.defer(ctx).await?;
        }

        let acronym = string_option(&command.data.options, "acronym");
        let content = match self.live_content(live, key, acronym).await {
            Ok(content) => content,
            Err(error) => {
                warn!(command = %command.data.name, %error, "Torn API request failed");
                render_error(&error)
            }
        };

        command
            .edit_response(
                ctx,
                EditInteractionResponse::new()
                    .content(content)
                    .allowed_mentions(no_mentions()),
            )
            .await?;
        Ok(())
    }

    async fn live_content(
        &self,
        live: LiveCommand,
        key: &str,
        acronym: Option<&str>,
    ) -> Result<String, TornError> {
        match live {
            LiveCommand::Stocks => {
                let stocks = self.torn.stocks(key).await?;
                Ok(render_stocks(&stocks, acronym))
            }
            LiveCommand::NetWorth => Ok(render_net_worth(&self.torn.net_worth(key).await?)),
            LiveCommand::Travel => Ok(render_travel(&self.torn.travel(key).await?)),
            LiveCommand::FlyProfits => profit_report(&self.torn, key, &self.flyprofits).await,
            LiveCommand::FlyStock => profit_report(&self.torn, key, &self.flystock).await,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected to Discord");
        let definitions = commands::definitions();
        match Command::set_global_commands(&ctx.http, definitions).await {
            Ok(registered) => info!(count = registered.len(), "slash commands registered"),
            Err(error) => error!(%error, "failed to register slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        info!(command = %command.data.name, user = %command.user.name, "command received");
        if let Err(error) = self.dispatch(&ctx, &command).await {
            error!(command = %command.data.name, %error, "failed to answer command");
        }
    }
}

/// Fetch quotes for the whole catalog, evaluate them for `view` and render the report.
pub async fn profit_report<T: Transport>(
    torn: &TornClient<T>,
    key: &str,
    view: &ProfitView,
) -> Result<String, TornError> {
    let entries = catalog::catalog();
    let quotes = torn.quotes_for(key, entries).await?;
    let mut records = view.evaluate(entries, &quotes);

    if view.is_grouped() && !records.is_empty() {
        match torn.foreign_stock().await {
            Ok(stock) => attach_stock(&mut records, &stock),
            Err(error) => warn!(%error, "foreign stock unavailable, rendering without counts"),
        }
    }

    Ok(format_report(&records, view))
}

fn no_mentions() -> CreateAllowedMentions {
    CreateAllowedMentions::new().empty_users().empty_roles()
}

fn make_resp(content: &str, ephemeral: bool) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(ephemeral)
            .allowed_mentions(no_mentions()),
    )
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use reqwest::Url;

    use super::*;
    use crate::bot::render::NO_QUALIFYING_RESULTS;
    use crate::infra::torn::{DEFAULT_BASE_URL, DEFAULT_FOREIGN_STOCK_URL};

    struct Routed(fn(&Url) -> Result<String, TornError>);

    impl Transport for Routed {
        fn get(&self, url: Url) -> impl Future<Output = Result<String, TornError>> + Send {
            std::future::ready((self.0)(&url))
        }
    }

    fn client(route: fn(&Url) -> Result<String, TornError>) -> TornClient<Routed> {
        TornClient::with_transport(Routed(route), DEFAULT_BASE_URL, DEFAULT_FOREIGN_STOCK_URL)
            .unwrap()
    }

    const NO_LISTINGS: &str = r#"{"itemmarket":{"listings":[]}}"#;
    const CAMEL_LISTINGS: &str =
        r#"{"itemmarket":{"listings":[{"price":16000,"amount":1},{"price":15500,"amount":3}]}}"#;
    const JAGUAR_LISTINGS: &str = r#"{"itemmarket":{"listings":[{"price":9000,"amount":1}]}}"#;
    const DAHLIA_LISTINGS: &str = r#"{"itemmarket":{"listings":[{"price":1300,"amount":1}]}}"#;
    const DAHLIA_STOCK: &str =
        r#"{"stocks":{"mex":{"update":1,"stocks":[{"id":260,"quantity":3120}]}}}"#;
    const RATE_LIMITED: &str = r#"{"error":{"code":5,"error":"Too many requests"}}"#;

    #[tokio::test]
    async fn top_profits_end_to_end() {
        let torn = client(|url| match url.path() {
            "/v2/market/384/itemmarket" => Ok(CAMEL_LISTINGS.into()),
            "/v2/market/258/itemmarket" => Ok(JAGUAR_LISTINGS.into()),
            _ => Ok(NO_LISTINGS.into()),
        });
        let view = ProfitView::top_profits(0);

        let report = profit_report(&torn, "key", &view).await.unwrap();

        assert!(report.contains(
            "**1.** Camel Plushie (UAE) | buy $14,000 | sell $15,500 | profit **$1,500**"
        ));
        assert!(!report.contains("Jaguar Plushie"));
    }

    #[tokio::test]
    async fn nothing_listed_renders_no_results() {
        let torn = client(|_| Ok(NO_LISTINGS.into()));
        let view = ProfitView::top_profits(0);

        let report = profit_report(&torn, "key", &view).await.unwrap();

        assert_eq!(report, NO_QUALIFYING_RESULTS);
    }

    #[tokio::test]
    async fn grouped_report_survives_missing_stock_export() {
        let torn = client(|url| match url.path() {
            "/v2/market/260/itemmarket" => Ok(DAHLIA_LISTINGS.into()),
            "/api/v1/travel/export/" => Err(TornError::ConnectionFailed("refused".into())),
            _ => Ok(NO_LISTINGS.into()),
        });
        let view = ProfitView::stock_by_country(0);

        let report = profit_report(&torn, "key", &view).await.unwrap();

        assert!(report.contains("__**Mexico**__"));
        assert!(report.contains(
            "`    ?` Dahlia | buy $300 | sell $1,300 | profit $1,000"
        ));
    }

    #[tokio::test]
    async fn grouped_report_shows_stock_counts() {
        let torn = client(|url| match url.path() {
            "/v2/market/260/itemmarket" => Ok(DAHLIA_LISTINGS.into()),
            "/api/v1/travel/export/" => Ok(DAHLIA_STOCK.into()),
            _ => Ok(NO_LISTINGS.into()),
        });
        let view = ProfitView::stock_by_country(0);

        let report = profit_report(&torn, "key", &view).await.unwrap();

        assert!(report.contains("`3,120` Dahlia"));
    }

    #[tokio::test]
    async fn rate_limit_fails_the_report() {
        let torn = client(|_| Ok(RATE_LIMITED.into())).with_max_attempts(1);
        let view = ProfitView::top_profits(0);

        let result = profit_report(&torn, "key", &view).await;

        assert_eq!(result, Err(TornError::RateLimited { attempts: 1 }));
    }
}
