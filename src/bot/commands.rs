//! Slash command names, descriptions and options.

use serenity::all::{CommandDataOption, CommandOptionType, CreateCommand, CreateCommandOption};

use crate::domain::Category;

/// Commands answered from the static catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupCommand {
    Category(Category),
    Country,
}

/// Commands that call the Torn API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveCommand {
    Stocks,
    NetWorth,
    Travel,
    FlyProfits,
    FlyStock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Lookup(LookupCommand),
    Live(LiveCommand),
}

impl BotCommand {
    pub const ALL: [BotCommand; 9] = [
        BotCommand::Lookup(LookupCommand::Category(Category::Plushie)),
        BotCommand::Lookup(LookupCommand::Category(Category::Flower)),
        BotCommand::Lookup(LookupCommand::Category(Category::Drug)),
        BotCommand::Lookup(LookupCommand::Country),
        BotCommand::Live(LiveCommand::Stocks),
        BotCommand::Live(LiveCommand::NetWorth),
        BotCommand::Live(LiveCommand::Travel),
        BotCommand::Live(LiveCommand::FlyProfits),
        BotCommand::Live(LiveCommand::FlyStock),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Lookup(LookupCommand::Category(Category::Plushie)) => "plushies",
            BotCommand::Lookup(LookupCommand::Category(Category::Flower)) => "flowers",
            BotCommand::Lookup(LookupCommand::Category(Category::Drug)) => "drugs",
            BotCommand::Lookup(LookupCommand::Country) => "country",
            BotCommand::Live(LiveCommand::Stocks) => "stocks",
            BotCommand::Live(LiveCommand::NetWorth) => "networth",
            BotCommand::Live(LiveCommand::Travel) => "travel",
            BotCommand::Live(LiveCommand::FlyProfits) => "flyprofits",
            BotCommand::Live(LiveCommand::FlyStock) => "flystock",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BotCommand::Lookup(LookupCommand::Category(Category::Plushie)) => {
                "Plushies sold abroad, by country"
            }
            BotCommand::Lookup(LookupCommand::Category(Category::Flower)) => {
                "Flowers sold abroad, by country"
            }
            BotCommand::Lookup(LookupCommand::Category(Category::Drug)) => {
                "Drugs sold abroad, by country"
            }
            BotCommand::Lookup(LookupCommand::Country) => {
                "Everything the bot knows is sold in one country"
            }
            BotCommand::Live(LiveCommand::Stocks) => "Current Torn stock exchange prices",
            BotCommand::Live(LiveCommand::NetWorth) => "Net worth of the API key owner",
            BotCommand::Live(LiveCommand::Travel) => "Travel status of the API key owner",
            BotCommand::Live(LiveCommand::FlyProfits) => "Top 5 most profitable items to fly home",
            BotCommand::Live(LiveCommand::FlyStock) => {
                "Profitable items and shelf stock, by country"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    pub fn definition(&self) -> CreateCommand {
        let command = CreateCommand::new(self.name()).description(self.description());
        match self {
            BotCommand::Lookup(LookupCommand::Country) => command.add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "name",
                    "Country name, e.g. Mexico",
                )
                .required(true),
            ),
            BotCommand::Lookup(_) => command,
            BotCommand::Live(live) => {
                let command = if *live == LiveCommand::Stocks {
                    command.add_option(CreateCommandOption::new(
                        CommandOptionType::String,
                        "acronym",
                        "Show a single stock, e.g. TSB",
                    ))
                } else {
                    command
                };
                command.add_option(CreateCommandOption::new(
                    CommandOptionType::String,
                    "key",
                    "Your Torn API key (the reply is then only visible to you)",
                ))
            }
        }
    }
}

pub fn definitions() -> Vec<CreateCommand> {
    BotCommand::ALL.iter().map(BotCommand::definition).collect()
}

/// Value of a string option, blank values treated as absent.
pub fn string_option<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_str())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
