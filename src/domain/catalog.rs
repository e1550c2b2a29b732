//! Static catalog of goods sold abroad.
//!
//! Vendor prices are the shop prices in each destination. Torn rebalances them rarely; when
//! that happens this table is updated by hand.

use super::entities::{CatalogEntry, Category, ItemId};

macro_rules! entry {
    ($id:expr, $name:expr, $price:expr, $country:expr, $category:ident) => {
        CatalogEntry {
            id: $id,
            name: $name,
            vendor_buy: $price,
            country: $country,
            category: Category::$category,
        }
    };
}

/// Ordered by flight time from Torn City.
static CATALOG: &[CatalogEntry] = &[
    entry!(258, "Jaguar Plushie", 10_000, "Mexico", Plushie),
    entry!(260, "Dahlia", 300, "Mexico", Flower),
    entry!(196, "Cannabis", 3_000, "Mexico", Drug),
    entry!(618, "Stingray Plushie", 400, "Cayman Islands", Plushie),
    entry!(617, "Banana Orchid", 4_000, "Cayman Islands", Flower),
    entry!(261, "Wolverine Plushie", 30, "Canada", Plushie),
    entry!(263, "Crocus", 600, "Canada", Flower),
    entry!(264, "Orchid", 700, "Hawaii", Flower),
    entry!(266, "Nessie Plushie", 200, "United Kingdom", Plushie),
    entry!(268, "Red Fox Plushie", 1_000, "United Kingdom", Plushie),
    entry!(267, "Heather", 5_000, "United Kingdom", Flower),
    entry!(269, "Monkey Plushie", 400, "Argentina", Plushie),
    entry!(271, "Ceibo Flower", 500, "Argentina", Flower),
    entry!(273, "Chamois Plushie", 400, "Switzerland", Plushie),
    entry!(272, "Edelweiss", 900, "Switzerland", Flower),
    entry!(277, "Cherry Blossom", 500, "Japan", Flower),
    entry!(206, "Xanax", 750_000, "Japan", Drug),
    entry!(274, "Panda Plushie", 400, "China", Plushie),
    entry!(276, "Peony", 5_000, "China", Flower),
    entry!(200, "Opium", 45_000, "China", Drug),
    entry!(384, "Camel Plushie", 14_000, "UAE", Plushie),
    entry!(385, "Tribulus Omanense", 6_000, "UAE", Flower),
    entry!(281, "Lion Plushie", 400, "South Africa", Plushie),
    entry!(282, "African Violet", 2_000, "South Africa", Flower),
];

/// Alternative spellings users type for a destination.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("cayman", "Cayman Islands"),
    ("uk", "United Kingdom"),
    ("england", "United Kingdom"),
    ("united arab emirates", "UAE"),
    ("dubai", "UAE"),
    ("sa", "South Africa"),
    ("swiss", "Switzerland"),
];

pub fn catalog() -> &'static [CatalogEntry] {
    CATALOG
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG
        .iter()
        .filter(move |entry| entry.category == category)
}

/// Destinations in catalog order, without duplicates.
pub fn countries() -> Vec<&'static str> {
    let mut countries: Vec<&'static str> = Vec::new();
    for entry in CATALOG {
        if !countries.contains(&entry.country) {
            countries.push(entry.country);
        }
    }
    countries
}

/// Resolve user input to a catalog country, ignoring case and surrounding whitespace.
pub fn find_country(input: &str) -> Option<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    countries()
        .into_iter()
        .find(|country| country.to_lowercase() == needle)
        .or_else(|| {
            COUNTRY_ALIASES
                .iter()
                .find(|(alias, _)| *alias == needle)
                .map(|(_, country)| *country)
        })
}

pub fn items_in(country: &str) -> Vec<&'static CatalogEntry> {
    CATALOG
        .iter()
        .filter(|entry| entry.country == country)
        .collect()
}

/// Groups entries by country, keeping the order in which countries first appear.
pub fn group_by_country<'a, I>(entries: I) -> Vec<(&'static str, Vec<&'a CatalogEntry>)>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut groups: Vec<(&'static str, Vec<&'a CatalogEntry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(country, _)| *country == entry.country) {
            Some((_, items)) => items.push(entry),
            None => groups.push((entry.country, vec![entry])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identifiers_are_unique() {
        let ids: HashSet<ItemId> = catalog().iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn country_lookup_ignores_case_and_aliases() {
        assert_eq!(find_country("  mexico "), Some("Mexico"));
        assert_eq!(find_country("SOUTH AFRICA"), Some("South Africa"));
        assert_eq!(find_country("uk"), Some("United Kingdom"));
        assert_eq!(find_country("Atlantis"), None);
        assert_eq!(find_country(""), None);
    }

    #[test]
    fn countries_follow_catalog_order() {
        let countries = countries();
        assert_eq!(countries.first(), Some(&"Mexico"));
        assert_eq!(countries.last(), Some(&"South Africa"));
        assert_eq!(countries.len(), 11);
    }

    #[test]
    fn grouping_keeps_first_appearance_order() {
        let groups = group_by_country(by_category(Category::Plushie));
        let names: Vec<_> = groups.iter().map(|(country, _)| *country).collect();
        assert_eq!(names[0], "Mexico");
        let uk = groups
            .iter()
            .find(|(country, _)| *country == "United Kingdom")
            .map(|(_, items)| items.len());
        assert_eq!(uk, Some(2));
    }

    #[test]
    fn items_in_country_cover_all_categories() {
        let mexico = items_in("Mexico");
        let categories: HashSet<Category> = mexico.iter().map(|entry| entry.category).collect();
        assert_eq!(categories.len(), 3);
        let camel = catalog().iter().find(|entry| entry.id == 384);
        assert_eq!(camel.map(|entry| entry.name), Some("Camel Plushie"));
    }
}
