//! Thin asynchronous client for the Torn City API.
//!
//! - Every request goes through [`fetch_with_retry`], which retries only on the provider's
//!   rate-limit code and turns every other failure into a [`TornError`].
//! - Responses are parsed into domain types; nothing is cached between requests.

use std::{collections::HashMap, future::Future, time::Duration};

use futures::{stream, StreamExt};
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    CatalogEntry, ForeignStock, ItemId, Listing, MarketQuote, NetWorth, StockQuote, TravelStatus,
};
use crate::util::version::user_agent;

pub const DEFAULT_BASE_URL: &str = "https://api.torn.com/";
pub const DEFAULT_FOREIGN_STOCK_URL: &str = "https://yata.yt/api/v1/travel/export/";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// "Too many requests".
pub const RATE_LIMIT_CODE: u16 = 5;
pub const INCORRECT_KEY_CODE: u16 = 2;
pub const DAILY_LIMIT_CODE: u16 = 14;
/// "Access level of this key is not high enough".
pub const ACCESS_LEVEL_CODE: u16 = 16;

const MARKET_FAN_OUT: usize = 4;

/// Failure of a single pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TornError {
    #[error("rate limited by the Torn API after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },
    #[error("could not reach the Torn API: {0}")]
    ConnectionFailed(String),
    #[error("invalid response from the Torn API: {0}")]
    InvalidResponseFormat(String),
    #[error("Torn API error {code}: {message}")]
    Provider { code: u16, message: String },
}

impl TornError {
    /// Errors that make the remaining requests of a batch pointless.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, TornError::RateLimited { .. } | TornError::ConnectionFailed(_))
    }
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Issues a GET and hands back the body of a successful response.
pub trait Transport: Send + Sync {
    fn get(&self, url: Url) -> impl Future<Output = Result<String, TornError>> + Send;
}

#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: Url) -> impl Future<Output = Result<String, TornError>> + Send {
        let request = self.http.get(url);
        async move {
            let response = request.send().await.map_err(transport_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(TornError::ConnectionFailed(format!("HTTP {status}")));
            }
            response.text().await.map_err(transport_error)
        }
    }
}

fn transport_error(error: reqwest::Error) -> TornError {
    // The URL carries the API key.
    let error = error.without_url();
    if error.is_timeout() {
        TornError::ConnectionFailed(format!(
            "request timed out after {}s",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else {
        TornError::ConnectionFailed(error.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderErrorDto,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDto {
    code: u16,
    #[serde(default)]
    error: String,
}

fn provider_error(payload: &Value) -> Option<ProviderErrorDto> {
    payload.get("error")?;
    serde_json::from_value::<ErrorEnvelope>(payload.clone())
        .ok()
        .map(|envelope| envelope.error)
}

/// GET `url`, backing off `2^attempt` seconds whenever the provider reports a rate limit.
///
/// Only the rate-limit code is retried; transport failures, unreadable bodies and every other
/// provider error end the invocation straight away.
pub async fn fetch_with_retry<T: Transport>(
    transport: &T,
    url: &Url,
    max_attempts: u32,
) -> Result<Value, TornError> {
    let max_attempts = max_attempts.max(1);

    for attempt in 0..max_attempts {
        debug!(path = url.path(), attempt, "requesting Torn API");
        let body = transport.get(url.clone()).await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|error| TornError::InvalidResponseFormat(error.to_string()))?;

        match provider_error(&payload) {
            None => return Ok(payload),
            Some(error) if error.code == RATE_LIMIT_CODE => {
                if attempt + 1 < max_attempts {
                    let delay = Duration::from_secs(1u64 << attempt);
                    warn!(
                        path = url.path(),
                        attempt,
                        delay_secs = delay.as_secs(),
                        "Torn API rate limit hit, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            Some(error) => {
                return Err(TornError::Provider {
                    code: error.code,
                    message: error.error,
                });
            }
        }
    }

    warn!(
        path = url.path(),
        max_attempts,
        "Torn API rate limit persisted"
    );
    Err(TornError::RateLimited {
        attempts: max_attempts,
    })
}

#[derive(Clone)]
pub struct TornClient<T = HttpTransport> {
    transport: T,
    base_url: Url,
    foreign_stock_url: Url,
    max_attempts: u32,
}

impl TornClient<HttpTransport> {
    pub fn new(base_url: &str, foreign_stock_url: &str) -> Result<Self, ClientBuildError> {
        Self::with_transport(HttpTransport::new()?, base_url, foreign_stock_url)
    }
}

impl<T: Transport> TornClient<T> {
    pub fn with_transport(
        transport: T,
        base_url: &str,
        foreign_stock_url: &str,
    ) -> Result<Self, ClientBuildError> {
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        Ok(Self {
            transport,
            base_url,
            foreign_stock_url: Url::parse(foreign_stock_url)?,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub async fn stocks(&self, key: &str) -> Result<Vec<StockQuote>, TornError> {
        let url = self.endpoint("torn/", Some("stocks"), key)?;
        let payload = self.fetch(&url).await?;
        parse_stocks(payload)
    }

    pub async fn market_quote(&self, key: &str, item_id: ItemId) -> Result<MarketQuote, TornError> {
        let url = self.endpoint(&format!("v2/market/{item_id}/itemmarket"), None, key)?;
        let payload = self.fetch(&url).await?;
        parse_market_quote(item_id, payload)
    }

    /// Fetch a quote for every entry. Items the provider refuses individually are left out;
    /// a rate limit or an unreachable provider fails the whole batch.
    pub async fn quotes_for(
        &self,
        key: &str,
        entries: &[CatalogEntry],
    ) -> Result<HashMap<ItemId, MarketQuote>, TornError> {
        let requests: Vec<_> = entries
            .iter()
            .map(|entry| {
                let item_id = entry.id;
                async move { (item_id, self.market_quote(key, item_id).await) }
            })
            .collect();
        let mut results = stream::iter(requests).buffer_unordered(MARKET_FAN_OUT);

        // Returning early drops the stream, cancelling requests still in flight.
        let mut quotes = HashMap::with_capacity(entries.len());
        while let Some((item_id, result)) = results.next().await {
            match result {
                Ok(quote) => {
                    quotes.insert(quote.item_id, quote);
                }
                Err(error) if error.aborts_batch() => {
                    warn!(item_id, %error, "aborting market batch");
                    return Err(error);
                }
                Err(error) => warn!(item_id, %error, "skipping item without a usable quote"),
            }
        }
        debug!(
            requested = entries.len(),
            received = quotes.len(),
            "market quotes loaded"
        );
        Ok(quotes)
    }

    pub async fn net_worth(&self, key: &str) -> Result<NetWorth, TornError> {
        let url = self.endpoint("user/", Some("basic,networth"), key)?;
        let payload = self.fetch(&url).await?;
        parse_net_worth(payload)
    }

    pub async fn travel(&self, key: &str) -> Result<TravelStatus, TornError> {
        let url = self.endpoint("user/", Some("basic,travel"), key)?;
        let payload = self.fetch(&url).await?;
        parse_travel(payload)
    }

    /// Shelf stock abroad. The export is public, so no key is sent.
    pub async fn foreign_stock(&self) -> Result<Vec<ForeignStock>, TornError> {
        let payload = self.fetch(&self.foreign_stock_url).await?;
        parse_foreign_stock(payload)
    }

    async fn fetch(&self, url: &Url) -> Result<Value, TornError> {
        fetch_with_retry(&self.transport, url, self.max_attempts).await
    }

    fn endpoint(&self, path: &str, selections: Option<&str>, key: &str) -> Result<Url, TornError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|error| TornError::ConnectionFailed(format!("invalid request URL: {error}")))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(selections) = selections {
                query.append_pair("selections", selections);
            }
            query.append_pair("key", key);
        }
        Ok(url)
    }
}

fn decode<D: DeserializeOwned>(payload: Value) -> Result<D, TornError> {
    serde_json::from_value(payload)
        .map_err(|error| TornError::InvalidResponseFormat(error.to_string()))
}

#[derive(Debug, Deserialize)]
struct StocksDto {
    stocks: HashMap<String, StockDto>,
}

#[derive(Debug, Deserialize)]
struct StockDto {
    name: String,
    acronym: String,
    current_price: f64,
    #[serde(default)]
    market_cap: u64,
    #[serde(default)]
    total_shares: u64,
}

impl From<StockDto> for StockQuote {
    fn from(dto: StockDto) -> Self {
        Self {
            name: dto.name,
            acronym: dto.acronym,
            current_price: dto.current_price,
            market_cap: dto.market_cap,
            total_shares: dto.total_shares,
        }
    }
}

fn parse_stocks(payload: Value) -> Result<Vec<StockQuote>, TornError> {
    let dto: StocksDto = decode(payload)?;
    let mut stocks: Vec<StockQuote> = dto.stocks.into_values().map(StockQuote::from).collect();
    stocks.sort_by(|a, b| a.acronym.cmp(&b.acronym));
    Ok(stocks)
}

#[derive(Debug, Deserialize)]
struct ListingDto {
    #[serde(alias = "cost")]
    price: u64,
}

impl From<ListingDto> for Listing {
    fn from(dto: ListingDto) -> Self {
        Self { price: dto.price }
    }
}

/// v2 nests listings under an object, v1 returned a bare array (or null when empty).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemMarketDto {
    Current {
        #[serde(default)]
        listings: Option<Vec<ListingDto>>,
    },
    Legacy(Vec<ListingDto>),
}

#[derive(Debug, Deserialize)]
struct MarketDto {
    #[serde(default)]
    itemmarket: Option<ItemMarketDto>,
    #[serde(default)]
    bazaar: Option<Vec<ListingDto>>,
}

fn parse_market_quote(item_id: ItemId, payload: Value) -> Result<MarketQuote, TornError> {
    let has_market = payload.get("itemmarket").is_some() || payload.get("bazaar").is_some();
    if !has_market {
        return Err(TornError::InvalidResponseFormat(format!(
            "market response for item {item_id} has no listings section"
        )));
    }

    let dto: MarketDto = decode(payload)?;
    let market = match dto.itemmarket {
        Some(ItemMarketDto::Current { listings }) => listings.unwrap_or_default(),
        Some(ItemMarketDto::Legacy(listings)) => listings,
        None => Vec::new(),
    };
    let listings = market
        .into_iter()
        .chain(dto.bazaar.unwrap_or_default())
        .map(Listing::from)
        .collect();
    Ok(MarketQuote::new(item_id, listings))
}

/// Net worth buckets in display order.
const NET_WORTH_BUCKETS: &[(&str, &str)] = &[
    ("wallet", "Wallet"),
    ("bank", "Bank"),
    ("cayman", "Cayman bank"),
    ("vault", "Vault"),
    ("piggybank", "Piggy bank"),
    ("points", "Points"),
    ("items", "Items"),
    ("displaycase", "Display case"),
    ("bazaar", "Bazaar"),
    ("itemmarket", "Item market"),
    ("properties", "Properties"),
    ("stockmarket", "Stock market"),
    ("auctionhouse", "Auction house"),
    ("company", "Company"),
    ("bookie", "Bookie"),
    ("enlistedcars", "Enlisted cars"),
    ("pending", "Pending"),
    ("loan", "Loan"),
    ("unpaidfees", "Unpaid fees"),
];

#[derive(Debug, Deserialize)]
struct NetWorthDto {
    player_id: u64,
    name: String,
    networth: HashMap<String, Value>,
}

fn parse_net_worth(payload: Value) -> Result<NetWorth, TornError> {
    let dto: NetWorthDto = decode(payload)?;
    let amount = |field: &str| dto.networth.get(field).and_then(Value::as_f64);

    let total = amount("total").ok_or_else(|| {
        TornError::InvalidResponseFormat("net worth response has no total".to_string())
    })?;
    let breakdown = NET_WORTH_BUCKETS
        .iter()
        .filter_map(|(field, label)| {
            amount(field)
                .filter(|value| *value != 0.0)
                .map(|value| (label.to_string(), value))
        })
        .collect();

    Ok(NetWorth {
        player_id: dto.player_id,
        player_name: dto.name,
        total,
        breakdown,
    })
}

#[derive(Debug, Deserialize)]
struct TravelResponseDto {
    name: String,
    travel: TravelDto,
}

#[derive(Debug, Deserialize)]
struct TravelDto {
    destination: String,
    #[serde(default)]
    method: Option<String>,
    /// Arrival time.
    timestamp: i64,
    time_left: u64,
}

fn parse_travel(payload: Value) -> Result<TravelStatus, TornError> {
    let dto: TravelResponseDto = decode(payload)?;
    Ok(TravelStatus {
        player_name: dto.name,
        destination: dto.travel.destination,
        method: dto.travel.method,
        arrival: dto.travel.timestamp,
        time_left: dto.travel.time_left,
    })
}

/// Country codes used by the foreign stock export.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("mex", "Mexico"),
    ("cay", "Cayman Islands"),
    ("can", "Canada"),
    ("haw", "Hawaii"),
    ("uni", "United Kingdom"),
    ("arg", "Argentina"),
    ("swi", "Switzerland"),
    ("jap", "Japan"),
    ("chi", "China"),
    ("uae", "UAE"),
    ("sou", "South Africa"),
];

#[derive(Debug, Deserialize)]
struct ForeignExportDto {
    stocks: HashMap<String, ForeignCountryDto>,
}

#[derive(Debug, Deserialize)]
struct ForeignCountryDto {
    #[serde(default)]
    stocks: Vec<ForeignItemDto>,
}

#[derive(Debug, Deserialize)]
struct ForeignItemDto {
    id: ItemId,
    #[serde(default)]
    quantity: u64,
}

fn parse_foreign_stock(payload: Value) -> Result<Vec<ForeignStock>, TornError> {
    let dto: ForeignExportDto = decode(payload)?;
    let mut stock = Vec::new();
    for (code, country) in dto.stocks {
        let Some((_, name)) = COUNTRY_CODES.iter().find(|(known, _)| *known == code) else {
            debug!(code = %code, "ignoring unknown foreign stock country");
            continue;
        };
        stock.extend(country.stocks.into_iter().map(|item| ForeignStock {
            country: name.to_string(),
            item_id: item.id,
            quantity: item.quantity,
        }));
    }
    Ok(stock)
}
