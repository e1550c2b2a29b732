//! Domain logic for foreign item valuation lives here.

pub mod catalog;
pub mod entities;
pub mod evaluation;

#[allow(unused_imports)]
pub use entities::{
    CatalogEntry, Category, ForeignStock, ItemId, Listing, MarketQuote, NetWorth, ProfitRecord,
    StockQuote, TravelStatus,
};
#[allow(unused_imports)]
pub use evaluation::{attach_stock, compute_profits, ProfitOrdering, ProfitView};
