use std::collections::HashMap;

use super::entities::{CatalogEntry, ForeignStock, ItemId, MarketQuote, ProfitRecord};

/// How profit records are ordered before rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfitOrdering {
    /// Best profit first.
    #[default]
    ProfitDescending,
    /// Countries alphabetically, best profit first within each country.
    CountryThenProfit,
}

/// Parameters that distinguish the profit commands from one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfitView {
    /// Inclusive lower bound on gross profit.
    pub min_profit: i64,
    pub ordering: ProfitOrdering,
    /// `None` renders every record the message budget allows.
    pub display_limit: Option<usize>,
}

impl ProfitView {
    pub const TOP_LIMIT: usize = 5;

    /// Ranked "top profits" view.
    pub fn top_profits(min_profit: i64) -> Self {
        Self {
            min_profit,
            ordering: ProfitOrdering::ProfitDescending,
            display_limit: Some(Self::TOP_LIMIT),
        }
    }

    /// Every qualifying item, grouped by destination.
    pub fn stock_by_country(min_profit: i64) -> Self {
        Self {
            min_profit,
            ordering: ProfitOrdering::CountryThenProfit,
            display_limit: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.ordering == ProfitOrdering::CountryThenProfit
    }

    pub fn evaluate(
        &self,
        catalog: &[CatalogEntry],
        quotes: &HashMap<ItemId, MarketQuote>,
    ) -> Vec<ProfitRecord> {
        compute_profits(catalog, quotes, self.min_profit, self.ordering)
    }
}

/// Derive profit records for every catalog entry that has market listings.
///
/// Entries without a quote, or with an empty one, are left out entirely rather than being
/// valued at zero. The sell price is always the cheapest listing.
pub fn compute_profits(
    catalog: &[CatalogEntry],
    quotes: &HashMap<ItemId, MarketQuote>,
    min_profit: i64,
    ordering: ProfitOrdering,
) -> Vec<ProfitRecord> {
    let mut records: Vec<ProfitRecord> = catalog
        .iter()
        .filter_map(|entry| {
            let market_sell = quotes.get(&entry.id)?.lowest_price()?;
            let profit = market_sell as i64 - entry.vendor_buy as i64;
            Some(ProfitRecord {
                id: entry.id,
                name: entry.name,
                country: entry.country,
                vendor_buy: entry.vendor_buy,
                market_sell,
                profit,
                stock: None,
            })
        })
        .filter(|record| record.profit >= min_profit)
        .collect();

    sort_records(&mut records, ordering);
    records
}

/// Stable sort by the given ordering.
pub fn sort_records(records: &mut [ProfitRecord], ordering: ProfitOrdering) {
    match ordering {
        ProfitOrdering::ProfitDescending => records.sort_by(|a, b| b.profit.cmp(&a.profit)),
        ProfitOrdering::CountryThenProfit => records.sort_by(|a, b| {
            a.country
                .cmp(b.country)
                .then_with(|| b.profit.cmp(&a.profit))
        }),
    }
}

/// Fill in shelf quantities from a foreign stock snapshot.
pub fn attach_stock(records: &mut [ProfitRecord], stock: &[ForeignStock]) {
    for record in records.iter_mut() {
        record.stock = stock
            .iter()
            .find(|item| item.item_id == record.id && item.country == record.country)
            .map(|item| item.quantity);
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::domain::entities::{Category, Listing};

    const BEST_FIRST: ProfitOrdering = ProfitOrdering::ProfitDescending;
    const BY_COUNTRY: ProfitOrdering = ProfitOrdering::CountryThenProfit;

    fn entry(
        id: ItemId,
        name: &'static str,
        vendor_buy: u64,
        country: &'static str,
    ) -> CatalogEntry {
        CatalogEntry {
            id,
            name,
            vendor_buy,
            country,
            category: Category::Plushie,
        }
    }

    fn quote(id: ItemId, prices: &[u64]) -> (ItemId, MarketQuote) {
        let listings = prices.iter().map(|&price| Listing { price }).collect();
        (id, MarketQuote::new(id, listings))
    }

    /// Four items whose profits are 5000, 20000, -100 and 15000.
    fn mixed_fixture() -> (Vec<CatalogEntry>, HashMap<ItemId, MarketQuote>) {
        let catalog = vec![
            entry(1, "Alpha", 1_000, "Mexico"),
            entry(2, "Bravo", 1_000, "Canada"),
            entry(3, "Charlie", 1_000, "Mexico"),
            entry(4, "Delta", 1_000, "Canada"),
        ];
        let quotes = HashMap::from([
            quote(1, &[6_000]),
            quote(2, &[21_000]),
            quote(3, &[900]),
            quote(4, &[16_000]),
        ]);
        (catalog, quotes)
    }

    #[test]
    fn camel_plushie_profit() {
        let catalog = [entry(267, "Camel Plushie", 14_000, "UAE")];
        let quotes = HashMap::from([quote(267, &[16_000, 15_500])]);

        let records = compute_profits(&catalog, &quotes, 0, BEST_FIRST);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].market_sell, 15_500);
        assert_eq!(records[0].profit, 1_500);
    }

    #[test]
    fn sorts_by_profit_descending() {
        let (catalog, quotes) = mixed_fixture();
        let records = compute_profits(&catalog, &quotes, i64::MIN, BEST_FIRST);
        let profits: Vec<i64> = records.iter().map(|r| r.profit).collect();
        assert_eq!(profits, vec![20_000, 15_000, 5_000, -100]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let (catalog, quotes) = mixed_fixture();
        let records = compute_profits(&catalog, &quotes, 15_000, BEST_FIRST);
        let profits: Vec<i64> = records.iter().map(|r| r.profit).collect();
        assert_eq!(profits, vec![20_000, 15_000]);
    }

    #[test]
    fn grouped_ordering_sorts_country_then_profit() {
        let (catalog, quotes) = mixed_fixture();
        let records = compute_profits(&catalog, &quotes, i64::MIN, BY_COUNTRY);
        let order: Vec<(&str, i64)> = records.iter().map(|r| (r.country, r.profit)).collect();
        assert_eq!(
            order,
            vec![
                ("Canada", 20_000),
                ("Canada", 15_000),
                ("Mexico", 5_000),
                ("Mexico", -100),
            ]
        );
    }

    #[test]
    fn equal_profits_keep_catalog_order() {
        let catalog = vec![
            entry(1, "First", 100, "Mexico"),
            entry(2, "Second", 100, "Mexico"),
            entry(3, "Third", 100, "Mexico"),
        ];
        let quotes = HashMap::from([quote(1, &[200]), quote(2, &[200]), quote(3, &[200])]);
        let records = compute_profits(&catalog, &quotes, 0, BEST_FIRST);
        let names: Vec<&str> = records.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn absent_or_empty_quotes_are_excluded() {
        let catalog = vec![
            entry(1, "Listed", 100, "Mexico"),
            entry(2, "Unlisted", 100, "Mexico"),
            entry(3, "Missing", 100, "Mexico"),
        ];
        let quotes = HashMap::from([quote(1, &[50]), quote(2, &[])]);

        let records = compute_profits(&catalog, &quotes, i64::MIN, BEST_FIRST);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Listed");
        assert_eq!(records[0].profit, -50);
    }

    #[test]
    fn market_sell_is_always_the_lowest_listing() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let count = rng.gen_range(0..12);
            let prices: Vec<u64> = (0..count).map(|_| rng.gen_range(0..5_000_000)).collect();
            let vendor_buy = rng.gen_range(0..1_000_000);
            let catalog = [entry(99, "Random", vendor_buy, "Japan")];
            let quotes = HashMap::from([quote(99, &prices)]);

            let records = compute_profits(&catalog, &quotes, i64::MIN, BEST_FIRST);

            match prices.iter().min() {
                Some(&lowest) => {
                    assert_eq!(records.len(), 1);
                    assert_eq!(records[0].market_sell, lowest);
                    assert_eq!(records[0].profit, lowest as i64 - vendor_buy as i64);
                }
                None => assert!(records.is_empty()),
            }
        }
    }

    #[test]
    fn views_carry_their_limits() {
        assert_eq!(ProfitView::top_profits(0).display_limit, Some(5));
        assert!(!ProfitView::top_profits(0).is_grouped());
        assert_eq!(ProfitView::stock_by_country(0).display_limit, None);
        assert!(ProfitView::stock_by_country(0).is_grouped());
    }

    #[test]
    fn stock_is_matched_by_item_and_country() {
        let (catalog, quotes) = mixed_fixture();
        let mut records = compute_profits(&catalog, &quotes, i64::MIN, BEST_FIRST);
        let stock = vec![
            ForeignStock {
                country: "Canada".into(),
                item_id: 2,
                quantity: 120,
            },
            ForeignStock {
                country: "Canada".into(),
                item_id: 1,
                quantity: 7,
            },
        ];

        attach_stock(&mut records, &stock);

        let bravo = records.iter().find(|r| r.name == "Bravo").map(|r| r.stock);
        let alpha = records.iter().find(|r| r.name == "Alpha").map(|r| r.stock);
        assert_eq!(bravo, Some(Some(120)));
        assert_eq!(alpha, Some(None));
    }
}
