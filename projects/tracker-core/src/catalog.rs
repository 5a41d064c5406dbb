use crate::errors::{Result, TrackerError};
use crate::types::Coin;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One complete, immutable catalog refresh
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    coins: Vec<Coin>,
    index: HashMap<String, usize>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// Validate a fetched coin list and index it by id
    pub fn build(coins: Vec<Coin>) -> Result<Self> {
        let mut index = HashMap::with_capacity(coins.len());

        for (position, coin) in coins.iter().enumerate() {
            if coin.id.trim().is_empty() {
                return Err(TrackerError::InvalidSnapshot(format!(
                    "coin at position {} has an empty id",
                    position
                )));
            }
            if !coin.current_price.is_finite() || coin.current_price < 0.0 {
                return Err(TrackerError::InvalidSnapshot(format!(
                    "coin {} has invalid price {}",
                    coin.id, coin.current_price
                )));
            }
            if coin.rank == 0 {
                return Err(TrackerError::InvalidSnapshot(format!(
                    "coin {} has rank 0",
                    coin.id
                )));
            }
            if index.insert(coin.id.clone(), position).is_some() {
                return Err(TrackerError::InvalidSnapshot(format!(
                    "duplicate coin id {}",
                    coin.id
                )));
            }
        }

        // Holdings belong to the portfolio, never to the catalog
        let coins = coins
            .into_iter()
            .map(|mut coin| {
                coin.current_holdings = None;
                coin
            })
            .collect();

        Ok(Self {
            coins,
            index,
            refreshed_at: Some(Utc::now()),
        })
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn get(&self, coin_id: &str) -> Option<&Coin> {
        self.index.get(coin_id).map(|&position| &self.coins[position])
    }

    pub fn price_of(&self, coin_id: &str) -> Option<f64> {
        self.get(coin_id).map(|coin| coin.current_price)
    }

    pub fn contains(&self, coin_id: &str) -> bool {
        self.index.contains_key(coin_id)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// When this snapshot was accepted; `None` for the initial empty catalog
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Catalog read model - serves the last accepted snapshot to readers
pub struct CoinCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
    stale: AtomicBool,
}

impl CoinCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(CatalogSnapshot::default())),
            stale: AtomicBool::new(false),
        }
    }

    /// Create a catalog primed with an initial snapshot
    pub fn with_coins(coins: Vec<Coin>) -> Result<Self> {
        let snapshot = CatalogSnapshot::build(coins)?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            stale: AtomicBool::new(false),
        })
    }

    /// Current snapshot. Holding the returned `Arc` pins that snapshot even
    /// if a refresh lands meanwhile.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Atomically replace the whole catalog. An invalid list is rejected and
    /// the previous snapshot stays in place.
    pub fn replace(&self, coins: Vec<Coin>) -> Result<usize> {
        let snapshot = match CatalogSnapshot::build(coins) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Rejected catalog snapshot: {}", e);
                return Err(e);
            }
        };
        let count = snapshot.len();

        *self.current.write() = Arc::new(snapshot);
        self.stale.store(false, Ordering::Release);

        log::info!("Catalog replaced with {} coins", count);
        Ok(count)
    }

    /// Record a failed refresh; the current snapshot keeps serving
    pub fn mark_stale(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Whether the most recent refresh attempt failed
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }
}

impl Default for CoinCatalog {
    fn default() -> Self {
        Self::new()
    }
}
