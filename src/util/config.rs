//! Bot configuration, loaded from environment variables.

use std::str::FromStr;

use thiserror::Error;

use crate::infra::torn::{DEFAULT_BASE_URL, DEFAULT_FOREIGN_STOCK_URL, DEFAULT_MAX_ATTEMPTS};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Discord bot token. Startup fails without it.
    pub discord_token: String,
    /// Fallback Torn API key for commands invoked without one.
    pub torn_api_key: Option<String>,
    /// Port the liveness endpoint binds to.
    pub port: u16,
    pub torn_base_url: String,
    pub foreign_stock_url: String,
    pub max_attempts: u32,
    pub flyprofits_min_profit: i64,
    pub flystock_min_profit: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("torn_api_key", &self.torn_api_key.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("torn_base_url", &self.torn_base_url)
            .field("foreign_stock_url", &self.foreign_stock_url)
            .field("max_attempts", &self.max_attempts)
            .field("flyprofits_min_profit", &self.flyprofits_min_profit)
            .field("flystock_min_profit", &self.flystock_min_profit)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `DISCORD_TOKEN` - required
    /// - `TORN_API_KEY` - fallback provider key
    /// - `PORT` - liveness endpoint port (default: 8080)
    /// - `TORN_API_BASE_URL` - provider base URL
    /// - `FOREIGN_STOCK_URL` - foreign stock export URL
    /// - `TORN_MAX_ATTEMPTS` - attempts per request on rate limiting (default: 3)
    /// - `FLYPROFITS_MIN_PROFIT` / `FLYSTOCK_MIN_PROFIT` - profit thresholds (default: 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let discord_token = var("DISCORD_TOKEN")
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let max_attempts: u32 = parse_or(&var, "TORN_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "TORN_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            discord_token,
            torn_api_key: var("TORN_API_KEY"),
            port: parse_or(&var, "PORT", DEFAULT_PORT)?,
            torn_base_url: var("TORN_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            foreign_stock_url: var("FOREIGN_STOCK_URL")
                .unwrap_or_else(|| DEFAULT_FOREIGN_STOCK_URL.to_string()),
            max_attempts,
            flyprofits_min_profit: parse_or(&var, "FLYPROFITS_MIN_PROFIT", 0)?,
            flystock_min_profit: parse_or(&var, "FLYSTOCK_MIN_PROFIT", 0)?,
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn missing_discord_token_is_fatal() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("DISCORD_TOKEN")));
        assert_eq!(
            load(&[("DISCORD_TOKEN", "   ")]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DISCORD_TOKEN", "token")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.torn_api_key, None);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.flyprofits_min_profit, 0);
        assert_eq!(config.torn_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("DISCORD_TOKEN", "token"),
            ("TORN_API_KEY", "abcd"),
            ("PORT", "3000"),
            ("TORN_MAX_ATTEMPTS", "5"),
            ("FLYSTOCK_MIN_PROFIT", "15000"),
        ])
        .unwrap();
        assert_eq!(config.torn_api_key.as_deref(), Some("abcd"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.flystock_min_profit, 15_000);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            load(&[("DISCORD_TOKEN", "token"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string(),
            })
        );
        let zero_attempts = load(&[("DISCORD_TOKEN", "token"), ("TORN_MAX_ATTEMPTS", "0")]);
        assert!(zero_attempts.is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[
            ("DISCORD_TOKEN", "very-secret"),
            ("TORN_API_KEY", "also-secret"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
    }
}
