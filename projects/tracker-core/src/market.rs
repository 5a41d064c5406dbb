use crate::types::Coin;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Supplier of complete catalog snapshots (market API client, fixtures, ...)
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the full list of tracked coins. An error means no snapshot is
    /// available this time.
    async fn fetch_coins(&self) -> anyhow::Result<Vec<Coin>>;

    /// Short label for logs
    fn name(&self) -> &str;
}

/// In-memory market data, for offline mode and tests
pub struct StaticMarketData {
    coins: RwLock<Vec<Coin>>,
    failure: RwLock<Option<String>>,
}

impl StaticMarketData {
    pub fn new(coins: Vec<Coin>) -> Self {
        Self {
            coins: RwLock::new(coins),
            failure: RwLock::new(None),
        }
    }

    /// Serve a different list from the next fetch on
    pub fn set_coins(&self, coins: Vec<Coin>) {
        *self.coins.write() = coins;
    }

    /// Make subsequent fetches fail with `reason`, or succeed again with `None`
    pub fn set_failure(&self, reason: Option<&str>) {
        *self.failure.write() = reason.map(str::to_string);
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn fetch_coins(&self) -> anyhow::Result<Vec<Coin>> {
        let failure = self.failure.read().clone();
        if let Some(reason) = failure {
            anyhow::bail!("{}", reason);
        }
        let coins = self.coins.read().clone();
        log::debug!("Serving {} static coins", coins.len());
        Ok(coins)
    }

    fn name(&self) -> &str {
        "static"
    }
}
