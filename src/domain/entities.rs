/// Identifier for items returned by the Torn API.
pub type ItemId = u32;

/// Kind of foreign goods the bot knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Plushie,
    Flower,
    Drug,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Plushie => "Plushies",
            Category::Flower => "Flowers",
            Category::Drug => "Drugs",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Plushie => "🧸",
            Category::Flower => "🌸",
            Category::Drug => "💊",
        }
    }
}

/// A statically known item that can be bought abroad.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ItemId,
    pub name: &'static str,
    /// Price paid at the foreign vendor.
    pub vendor_buy: u64,
    pub country: &'static str,
    pub category: Category,
}

/// One sell listing on the item market.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Listing {
    pub price: u64,
}

/// Live sell listings for a single item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketQuote {
    pub item_id: ItemId,
    pub listings: Vec<Listing>,
}

impl MarketQuote {
    pub fn new(item_id: ItemId, listings: Vec<Listing>) -> Self {
        Self { item_id, listings }
    }

    /// Cheapest listing price, if there is any listing at all.
    pub fn lowest_price(&self) -> Option<u64> {
        self.listings.iter().map(|listing| listing.price).min()
    }
}

/// Derived per-request view of what flying an item home would earn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfitRecord {
    pub id: ItemId,
    pub name: &'static str,
    pub country: &'static str,
    pub vendor_buy: u64,
    pub market_sell: u64,
    pub profit: i64,
    /// Quantity on the shelves abroad, when a stock snapshot was available.
    pub stock: Option<u64>,
}

/// Entry on the Torn stock exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct StockQuote {
    pub name: String,
    pub acronym: String,
    pub current_price: f64,
    pub market_cap: u64,
    pub total_shares: u64,
}

/// Net worth of the owner of an API key.
#[derive(Clone, Debug, PartialEq)]
pub struct NetWorth {
    pub player_id: u64,
    pub player_name: String,
    pub total: f64,
    /// Individual buckets in the order the provider lists them, zero entries dropped.
    pub breakdown: Vec<(String, f64)>,
}

/// Travel state of the owner of an API key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TravelStatus {
    pub player_name: String,
    pub destination: String,
    pub method: Option<String>,
    pub arrival: i64,
    pub time_left: u64,
}

impl TravelStatus {
    pub fn is_flying(&self) -> bool {
        self.time_left > 0
    }
}

/// Item stock currently available in one foreign country.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignStock {
    pub country: String,
    pub item_id: ItemId,
    pub quantity: u64,
}
