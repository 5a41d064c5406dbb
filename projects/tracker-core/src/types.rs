use serde::{Deserialize, Serialize};

// ========== Market Types ==========

/// A tracked coin with its latest market data.
///
/// `current_holdings` is only set on coins projected out of the portfolio;
/// catalog entries always carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub rank: u32,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub current_holdings: Option<f64>,
}

impl Coin {
    pub fn new(id: &str, symbol: &str, name: &str, current_price: f64, rank: u32) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            current_price,
            rank,
            price_change_percentage_24h: None,
            current_holdings: None,
        }
    }

    pub fn with_change_24h(mut self, percentage: f64) -> Self {
        self.price_change_percentage_24h = Some(percentage);
        self
    }

    /// Copy of this coin annotated with a held quantity
    pub fn with_holdings(&self, quantity: f64) -> Self {
        Coin {
            current_holdings: Some(quantity),
            ..self.clone()
        }
    }

    /// Value of the annotated holdings at the current price, 0 when not held
    pub fn current_holdings_value(&self) -> f64 {
        self.current_holdings
            .map(|quantity| quantity * self.current_price)
            .unwrap_or(0.0)
    }
}

// ========== Portfolio Types ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Held coins the catalog resolves; ids listed in `unresolved` are not counted
    pub holdings_count: usize,
    /// `None` when the user hides the portfolio value
    pub total_value: Option<f64>,
    pub value_change_24h: f64,
    /// Held ids the current catalog cannot price
    pub unresolved: Vec<String>,
}

// ========== Refresh Types ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { coins: usize },
    Stale { reason: String },
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }
}
