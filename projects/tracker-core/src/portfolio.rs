use crate::catalog::CatalogSnapshot;
use crate::errors::{Result, TrackerError};
use crate::types::Coin;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Parse a user-typed quantity ("1.5", " 2 ") into a valid holding amount
pub fn parse_quantity(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let quantity: f64 = trimmed
        .parse()
        .map_err(|_| TrackerError::InvalidQuantity(format!("not a number: {:?}", trimmed)))?;
    validate_quantity(quantity)
}

fn validate_quantity(quantity: f64) -> Result<f64> {
    if !quantity.is_finite() {
        return Err(TrackerError::InvalidQuantity(format!("not finite: {}", quantity)));
    }
    if quantity < 0.0 {
        return Err(TrackerError::InvalidQuantity(format!("negative: {}", quantity)));
    }
    // Fold -0.0 into 0.0
    Ok(quantity + 0.0)
}

fn validate_coin_id(coin_id: &str) -> Result<()> {
    if coin_id.trim().is_empty() {
        return Err(TrackerError::InvalidCoinId(coin_id.to_string()));
    }
    Ok(())
}

/// Portfolio store - owns coin id -> held quantity.
///
/// A quantity of zero is a real entry; only `remove_holding` evicts.
/// Iteration is in ascending id order so aggregates are reproducible.
pub struct PortfolioStore {
    holdings: RwLock<BTreeMap<String, f64>>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self {
            holdings: RwLock::new(BTreeMap::new()),
        }
    }

    /// Set the held quantity for a coin, replacing any previous value
    pub fn upsert_holding(&self, coin_id: &str, quantity: f64) -> Result<()> {
        validate_coin_id(coin_id)?;
        let quantity = validate_quantity(quantity)?;

        let previous = self.holdings.write().insert(coin_id.to_string(), quantity);
        match previous {
            Some(old) => log::debug!("Updated holding {}: {} -> {}", coin_id, old, quantity),
            None => log::debug!("Added holding {}: {}", coin_id, quantity),
        }
        Ok(())
    }

    /// Remove a holding entirely, returning the quantity it had
    pub fn remove_holding(&self, coin_id: &str) -> Option<f64> {
        let removed = self.holdings.write().remove(coin_id);
        if removed.is_some() {
            log::debug!("Removed holding {}", coin_id);
        }
        removed
    }

    /// Replace every entry at once (startup load). All entries are checked
    /// before anything is swapped in.
    pub fn load(&self, holdings: BTreeMap<String, f64>) -> Result<()> {
        let mut validated = BTreeMap::new();
        for (coin_id, quantity) in holdings {
            validate_coin_id(&coin_id)?;
            let quantity = validate_quantity(quantity)?;
            validated.insert(coin_id, quantity);
        }

        let count = validated.len();
        *self.holdings.write() = validated;
        log::info!("Loaded {} holdings", count);
        Ok(())
    }

    pub fn clear(&self) {
        self.holdings.write().clear();
    }

    pub fn holding(&self, coin_id: &str) -> Option<f64> {
        self.holdings.read().get(coin_id).copied()
    }

    /// Copy of the current mapping
    pub fn holdings(&self) -> BTreeMap<String, f64> {
        self.holdings.read().clone()
    }

    pub fn len(&self) -> usize {
        self.holdings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.read().is_empty()
    }

    /// Value of one holding at the catalog price; 0 when unheld or unpriced
    pub fn holdings_value(&self, coin_id: &str, catalog: &CatalogSnapshot) -> f64 {
        match (self.holding(coin_id), catalog.price_of(coin_id)) {
            (Some(quantity), Some(price)) => quantity * price,
            _ => 0.0,
        }
    }

    /// Catalog coins the user holds, annotated with their quantity, in
    /// catalog order
    pub fn portfolio_coins(&self, catalog: &CatalogSnapshot) -> Vec<Coin> {
        let holdings = self.holdings.read();
        catalog
            .coins()
            .iter()
            .filter_map(|coin| holdings.get(&coin.id).map(|&quantity| coin.with_holdings(quantity)))
            .collect()
    }

    /// Held ids the catalog does not know about
    pub fn unresolved_holdings(&self, catalog: &CatalogSnapshot) -> Vec<String> {
        self.holdings
            .read()
            .keys()
            .filter(|coin_id| !catalog.contains(coin_id))
            .cloned()
            .collect()
    }

    /// Sum of all priced holdings, accumulated in ascending id order
    pub fn total_value(&self, catalog: &CatalogSnapshot) -> f64 {
        self.holdings
            .read()
            .iter()
            .filter_map(|(coin_id, &quantity)| {
                catalog.price_of(coin_id).map(|price| quantity * price)
            })
            .sum()
    }

    /// Change in portfolio value over the last 24h, derived from each coin's
    /// percentage change. Coins without a usable change figure contribute
    /// nothing.
    pub fn value_change_24h(&self, catalog: &CatalogSnapshot) -> f64 {
        self.holdings
            .read()
            .iter()
            .filter_map(|(coin_id, &quantity)| {
                let coin = catalog.get(coin_id)?;
                let percentage = coin.price_change_percentage_24h?;
                let factor = 1.0 + percentage / 100.0;
                if !factor.is_finite() || factor <= 0.0 {
                    return None;
                }
                let current = quantity * coin.current_price;
                Some(current - current / factor)
            })
            .sum()
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::build(vec![
            Coin::new("btc", "btc", "Bitcoin", 50000.0, 1),
            Coin::new("eth", "eth", "Ethereum", 3000.0, 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_upsert_and_value() {
        let _ = env_logger::try_init();
        let store = PortfolioStore::new();
        let catalog = catalog();

        store.upsert_holding("btc", 0.5).unwrap();
        assert_eq!(store.holdings_value("btc", &catalog), 25000.0);

        store.upsert_holding("btc", 1.0).unwrap();
        assert_eq!(store.holding("btc"), Some(1.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_quantities_leave_store_unchanged() {
        let store = PortfolioStore::new();
        store.upsert_holding("btc", 0.5).unwrap();

        for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = store.upsert_holding("btc", bad);
            assert!(matches!(result, Err(TrackerError::InvalidQuantity(_))), "accepted {}", bad);
        }
        assert_eq!(store.holding("btc"), Some(0.5));
    }

    #[test]
    fn test_empty_coin_id_rejected() {
        let store = PortfolioStore::new();
        assert!(matches!(
            store.upsert_holding("", 1.0),
            Err(TrackerError::InvalidCoinId(_))
        ));
        assert!(store.upsert_holding("   ", 1.0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_is_kept_as_distinct_holding() {
        let store = PortfolioStore::new();
        let catalog = catalog();

        store.upsert_holding("eth", 0.0).unwrap();
        assert_eq!(store.holding("eth"), Some(0.0));
        assert_eq!(store.holdings_value("eth", &catalog), 0.0);

        let coins = store.portfolio_coins(&catalog);
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].current_holdings, Some(0.0));

        assert_eq!(store.remove_holding("eth"), Some(0.0));
        assert!(store.portfolio_coins(&catalog).is_empty());
        assert_eq!(store.remove_holding("eth"), None);
    }

    #[test]
    fn test_negative_zero_normalized() {
        let store = PortfolioStore::new();
        store.upsert_holding("btc", -0.0).unwrap();
        let quantity = store.holding("btc").unwrap();
        assert!(quantity.is_sign_positive());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 1.5 ").unwrap(), 1.5);
        assert_eq!(parse_quantity("2").unwrap(), 2.0);
        assert_eq!(parse_quantity("0").unwrap(), 0.0);
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("-3").is_err());
        assert!(parse_quantity("NaN").is_err());
        assert!(parse_quantity("inf").is_err());
    }

    #[test]
    fn test_unknown_coin_resolves_to_zero() {
        let store = PortfolioStore::new();
        let catalog = catalog();

        store.upsert_holding("doge", 1000.0).unwrap();
        store.upsert_holding("eth", 2.0).unwrap();

        assert_eq!(store.holdings_value("doge", &catalog), 0.0);
        assert_eq!(store.total_value(&catalog), 6000.0);
        assert_eq!(store.unresolved_holdings(&catalog), vec!["doge".to_string()]);

        let coins = store.portfolio_coins(&catalog);
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].id, "eth");
    }

    #[test]
    fn test_total_value_tracks_mutations() {
        let store = PortfolioStore::new();
        let catalog = catalog();

        store.upsert_holding("btc", 0.5).unwrap();
        let before = store.total_value(&catalog);
        store.upsert_holding("eth", 2.0).unwrap();
        assert_eq!(store.total_value(&catalog), before + 6000.0);

        store.upsert_holding("eth", 0.0).unwrap();
        assert_eq!(store.total_value(&catalog), before);

        store.remove_holding("btc");
        assert_eq!(store.total_value(&catalog), 0.0);
    }

    #[test]
    fn test_load_rejects_invalid_entries_atomically() {
        let store = PortfolioStore::new();
        store.upsert_holding("btc", 1.0).unwrap();

        let mut bad = BTreeMap::new();
        bad.insert("eth".to_string(), 2.0);
        bad.insert("sol".to_string(), -5.0);
        assert!(store.load(bad).is_err());
        assert_eq!(store.holdings().len(), 1);
        assert_eq!(store.holding("btc"), Some(1.0));

        let mut good = BTreeMap::new();
        good.insert("eth".to_string(), 2.0);
        store.load(good).unwrap();
        assert_eq!(store.holding("btc"), None);
        assert_eq!(store.holding("eth"), Some(2.0));
    }

    #[test]
    fn test_value_change_24h() {
        let snapshot = CatalogSnapshot::build(vec![
            Coin::new("btc", "btc", "Bitcoin", 110.0, 1).with_change_24h(10.0),
            Coin::new("eth", "eth", "Ethereum", 50.0, 2),
        ])
        .unwrap();
        let store = PortfolioStore::new();
        store.upsert_holding("btc", 1.0).unwrap();
        store.upsert_holding("eth", 4.0).unwrap();

        let change = store.value_change_24h(&snapshot);
        assert!((change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_change_24h_skips_unusable_percentages() {
        let snapshot = CatalogSnapshot::build(vec![
            Coin::new("btc", "btc", "Bitcoin", 100.0, 1).with_change_24h(f64::NAN),
            Coin::new("eth", "eth", "Ethereum", 105.0, 2).with_change_24h(5.0),
            Coin::new("sol", "sol", "Solana", 10.0, 3).with_change_24h(f64::INFINITY),
            Coin::new("ada", "ada", "Cardano", 1.0, 4).with_change_24h(-100.0),
        ])
        .unwrap();
        let store = PortfolioStore::new();
        for coin_id in ["btc", "eth", "sol", "ada"] {
            store.upsert_holding(coin_id, 1.0).unwrap();
        }

        let change = store.value_change_24h(&snapshot);
        assert!(change.is_finite());
        assert!((change - 5.0).abs() < 1e-9);
    }
}
