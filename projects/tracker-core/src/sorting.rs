use crate::types::Coin;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Display orderings offered by the coin lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Rank,
    RankReversed,
    Price,
    PriceReversed,
    Holdings,
    HoldingsReversed,
}

impl SortOption {
    /// Flip between a sort and its reversed variant (sort header tap)
    pub fn toggled(self) -> Self {
        match self {
            SortOption::Rank => SortOption::RankReversed,
            SortOption::RankReversed => SortOption::Rank,
            SortOption::Price => SortOption::PriceReversed,
            SortOption::PriceReversed => SortOption::Price,
            SortOption::Holdings => SortOption::HoldingsReversed,
            SortOption::HoldingsReversed => SortOption::Holdings,
        }
    }

    pub fn is_reversed(self) -> bool {
        matches!(
            self,
            SortOption::RankReversed | SortOption::PriceReversed | SortOption::HoldingsReversed
        )
    }

    fn compare_key(self, a: &Coin, b: &Coin) -> Ordering {
        match self {
            SortOption::Rank | SortOption::RankReversed => a.rank.cmp(&b.rank),
            SortOption::Price | SortOption::PriceReversed => {
                a.current_price.total_cmp(&b.current_price)
            }
            SortOption::Holdings | SortOption::HoldingsReversed => a
                .current_holdings
                .unwrap_or(0.0)
                .total_cmp(&b.current_holdings.unwrap_or(0.0)),
        }
    }
}

/// Keep coins whose name or symbol contains the query, case-insensitively.
/// A blank query keeps everything. Input order is preserved.
pub fn filter_coins(coins: &[Coin], query: &str) -> Vec<Coin> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return coins.to_vec();
    }

    coins
        .iter()
        .filter(|coin| {
            coin.name.to_lowercase().contains(&needle)
                || coin.symbol.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Sort in place. Ties fall back to id ascending regardless of direction.
pub fn sort_coins(coins: &mut [Coin], option: SortOption) {
    coins.sort_by(|a, b| {
        let primary = option.compare_key(a, b);
        let primary = if option.is_reversed() { primary.reverse() } else { primary };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

/// Filter then sort into a fresh list; the input is left untouched
pub fn filter_and_sort(coins: &[Coin], query: &str, option: SortOption) -> Vec<Coin> {
    let mut result = filter_coins(coins, query);
    sort_coins(&mut result, option);
    result
}
