pub mod catalog;
pub mod errors;
pub mod market;
pub mod persistence;
pub mod portfolio;
pub mod settings;
pub mod sorting;
pub mod tracker;
pub mod types;

// Re-export main types and the tracker
pub use catalog::{CatalogSnapshot, CoinCatalog};
pub use errors::TrackerError;
pub use market::{MarketDataSource, StaticMarketData};
pub use persistence::{HoldingsPersistence, MemoryPersistence};
pub use portfolio::{parse_quantity, PortfolioStore};
pub use settings::TrackerSettings;
pub use sorting::{filter_and_sort, filter_coins, sort_coins, SortOption};
pub use tracker::PortfolioTracker;
pub use types::*;

/// Initialize a tracker from the settings file in the user's home directory
pub fn init_tracker() -> anyhow::Result<PortfolioTracker> {
    let settings = TrackerSettings::load_or_default()?;
    Ok(PortfolioTracker::new(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_initialization() {
        let _ = env_logger::try_init();
        let tracker = PortfolioTracker::new(TrackerSettings::default());
        assert!(tracker.catalog().snapshot().is_empty());
        assert!(tracker.store().is_empty());
        assert_eq!(tracker.total_value(), 0.0);
    }

    #[test]
    fn test_init_tracker_without_settings_file() {
        let _ = env_logger::try_init();
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::env::set_var("HOME", temp_dir.path());

        assert!(!settings::default_settings_path().exists());
        let tracker = init_tracker().unwrap();
        assert_eq!(tracker.settings(), &TrackerSettings::default());
        assert!(tracker.store().is_empty());
    }
}
