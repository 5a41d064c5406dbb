use crate::catalog::CoinCatalog;
use crate::errors::Result;
use crate::market::MarketDataSource;
use crate::persistence::HoldingsPersistence;
use crate::portfolio::{parse_quantity, PortfolioStore};
use crate::settings::TrackerSettings;
use crate::sorting::{filter_and_sort, SortOption};
use crate::types::{Coin, PortfolioSummary, RefreshOutcome};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Main tracker - the state behind the home and edit-portfolio screens
pub struct PortfolioTracker {
    catalog: CoinCatalog,
    store: PortfolioStore,
    settings: TrackerSettings,
    persistence: Option<Arc<dyn HoldingsPersistence>>,
    refresh_lock: Mutex<()>,
    /// Held across a holdings change and its save so saves land in order
    write_lock: parking_lot::Mutex<()>,
}

impl PortfolioTracker {
    /// Create a tracker with an empty catalog and portfolio
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            catalog: CoinCatalog::new(),
            store: PortfolioStore::new(),
            settings,
            persistence: None,
            refresh_lock: Mutex::new(()),
            write_lock: parking_lot::Mutex::new(()),
        }
    }

    /// Create a tracker backed by a persistence collaborator. Saved holdings
    /// are loaded immediately; a failed or invalid load starts empty.
    pub fn with_persistence(
        settings: TrackerSettings,
        persistence: Arc<dyn HoldingsPersistence>,
    ) -> Self {
        let mut tracker = Self::new(settings);

        match persistence.load() {
            Ok(holdings) => {
                if let Err(e) = tracker.store.load(holdings) {
                    log::error!("Ignoring saved holdings: {}", e);
                }
            }
            Err(e) => log::error!("Failed to load saved holdings: {}", e),
        }

        tracker.persistence = Some(persistence);
        tracker
    }

    pub fn catalog(&self) -> &CoinCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &PortfolioStore {
        &self.store
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    // ========== Catalog Refresh ==========

    /// Pull a new catalog from `source`. On failure the previous snapshot
    /// keeps serving and the outcome is `Stale`. Concurrent refreshes are
    /// applied one at a time.
    pub async fn refresh(&self, source: &dyn MarketDataSource) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;

        let coins = match source.fetch_coins().await {
            Ok(coins) => coins,
            Err(e) => {
                log::warn!(
                    "Market data from {} unavailable, keeping previous catalog: {}",
                    source.name(),
                    e
                );
                self.catalog.mark_stale();
                return RefreshOutcome::Stale { reason: e.to_string() };
            }
        };

        match self.catalog.replace(coins) {
            Ok(count) => {
                let unresolved = self.store.unresolved_holdings(&self.catalog.snapshot());
                if !unresolved.is_empty() {
                    log::warn!("Holdings without market data: {:?}", unresolved);
                }
                RefreshOutcome::Updated { coins: count }
            }
            Err(e) => {
                self.catalog.mark_stale();
                RefreshOutcome::Stale { reason: e.to_string() }
            }
        }
    }

    // ========== Holdings ==========

    /// Save a quantity typed by the user
    pub fn update_holding(&self, coin_id: &str, quantity_text: &str) -> Result<()> {
        let quantity = parse_quantity(quantity_text)?;
        self.set_holding(coin_id, quantity)
    }

    pub fn set_holding(&self, coin_id: &str, quantity: f64) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.store.upsert_holding(coin_id, quantity)?;
        log::info!("Saved holding {} = {}", coin_id, quantity);
        self.persist();
        Ok(())
    }

    pub fn remove_holding(&self, coin_id: &str) -> Option<f64> {
        let _guard = self.write_lock.lock();
        let removed = self.store.remove_holding(coin_id);
        if removed.is_some() {
            log::info!("Removed holding {}", coin_id);
            self.persist();
        }
        removed
    }

    // Callers hold `write_lock`
    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&self.store.holdings()) {
                log::warn!("Failed to save holdings, continuing in memory: {}", e);
            }
        }
    }

    // ========== Views ==========

    /// Full market list
    pub fn all_coins(&self, query: &str, sort: SortOption) -> Vec<Coin> {
        filter_and_sort(self.catalog.snapshot().coins(), query, sort)
    }

    /// Held coins annotated with their quantities
    pub fn portfolio_coins(&self, query: &str, sort: SortOption) -> Vec<Coin> {
        let snapshot = self.catalog.snapshot();
        filter_and_sort(&self.store.portfolio_coins(&snapshot), query, sort)
    }

    /// Coins offered on the edit screen: the current holdings while the
    /// search box is blank, otherwise any matching catalog coin (with its
    /// holdings attached when held)
    pub fn edit_candidates(&self, query: &str, sort: SortOption) -> Vec<Coin> {
        if query.trim().is_empty() {
            return self.portfolio_coins(query, sort);
        }

        let snapshot = self.catalog.snapshot();
        let annotated: Vec<Coin> = snapshot
            .coins()
            .iter()
            .map(|coin| match self.store.holding(&coin.id) {
                Some(quantity) => coin.with_holdings(quantity),
                None => coin.clone(),
            })
            .collect();
        filter_and_sort(&annotated, query, sort)
    }

    pub fn holdings_value(&self, coin_id: &str) -> f64 {
        self.store.holdings_value(coin_id, &self.catalog.snapshot())
    }

    pub fn total_value(&self) -> f64 {
        self.store.total_value(&self.catalog.snapshot())
    }

    pub fn summary(&self) -> PortfolioSummary {
        let snapshot = self.catalog.snapshot();
        let total_value = self
            .settings
            .show_portfolio_value
            .then(|| self.store.total_value(&snapshot));

        PortfolioSummary {
            holdings_count: self.store.portfolio_coins(&snapshot).len(),
            total_value,
            value_change_24h: self.store.value_change_24h(&snapshot),
            unresolved: self.store.unresolved_holdings(&snapshot),
        }
    }
}
