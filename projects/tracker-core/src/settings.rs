use crate::errors::{Result, TrackerError};
use crate::sorting::SortOption;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD"];
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 15;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 300;

/// User-facing tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub currency: String,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub show_portfolio_value: bool,
    pub default_sort: SortOption,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            auto_refresh: true,
            refresh_interval_secs: 30,
            show_portfolio_value: true,
            default_sort: SortOption::Rank,
        }
    }
}

impl TrackerSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: TrackerSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading settings from: {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load from the default location, falling back to defaults when the file
    /// does not exist yet
    pub fn load_or_default() -> Result<Self> {
        let path = default_settings_path();
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_CURRENCIES.contains(&self.currency.as_str()) {
            return Err(TrackerError::InvalidSettings(format!(
                "unsupported currency {}",
                self.currency
            )));
        }
        let allowed = MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS;
        if !allowed.contains(&self.refresh_interval_secs) {
            return Err(TrackerError::InvalidSettings(format!(
                "refresh interval {}s outside {}..={}",
                self.refresh_interval_secs, MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS
            )));
        }
        Ok(())
    }

    /// Interval between catalog refreshes, `None` when auto refresh is off
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.auto_refresh
            .then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".crypto-tracker")
        .join("settings.json")
}
