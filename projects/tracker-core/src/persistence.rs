use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Storage collaborator for the holdings mapping. The tracker loads once at
/// startup and saves after each successful change; it keeps working in
/// memory when either call fails.
pub trait HoldingsPersistence: Send + Sync {
    fn load(&self) -> anyhow::Result<BTreeMap<String, f64>>;

    fn save(&self, holdings: &BTreeMap<String, f64>) -> anyhow::Result<()>;
}

/// Keeps the last saved mapping in process memory
#[derive(Default)]
pub struct MemoryPersistence {
    saved: Mutex<BTreeMap<String, f64>>,
    saves: Mutex<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing mapping, as if saved by a previous session
    pub fn with_holdings(holdings: BTreeMap<String, f64>) -> Self {
        Self {
            saved: Mutex::new(holdings),
            saves: Mutex::new(0),
        }
    }

    pub fn saved(&self) -> BTreeMap<String, f64> {
        self.saved.lock().clone()
    }

    /// Number of `save` calls received
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl HoldingsPersistence for MemoryPersistence {
    fn load(&self) -> anyhow::Result<BTreeMap<String, f64>> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, holdings: &BTreeMap<String, f64>) -> anyhow::Result<()> {
        *self.saved.lock() = holdings.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let persistence = MemoryPersistence::new();
        assert!(persistence.load().unwrap().is_empty());

        let mut holdings = BTreeMap::new();
        holdings.insert("btc".to_string(), 0.25);
        persistence.save(&holdings).unwrap();

        assert_eq!(persistence.load().unwrap(), holdings);
        assert_eq!(persistence.save_count(), 1);
    }
}
