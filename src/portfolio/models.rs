use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time statistics for one position.
///
/// All fields are plain decimals; the engine guards every division, so no
/// NaN/Infinity-like state exists. A position whose id is missing from the
/// price snapshot values to all zeros with `avg_purchase_price` `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetValuation {
    /// Current market value (`amount * current_price`).
    pub value: Decimal,
    /// Cost basis: total paid across the purchase history.
    pub cost: Decimal,
    /// Unrealized profit (`value - cost`).
    pub profit: Decimal,
    /// Profit as a percentage of cost; 0 when the cost basis is zero.
    pub profit_percentage: Decimal,
    /// Weighted-average purchase price. `None` when the transaction history
    /// is empty (nothing to average over) or no price data exists.
    pub avg_purchase_price: Option<Decimal>,
}

impl AssetValuation {
    pub fn zero() -> Self {
        Self {
            value: Decimal::ZERO,
            cost: Decimal::ZERO,
            profit: Decimal::ZERO,
            profit_percentage: Decimal::ZERO,
            avg_purchase_price: None,
        }
    }
}

/// Portfolio-wide aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    /// 0 when total cost is zero.
    pub total_profit_percentage: Decimal,
    /// Absolute value movement attributable to the trailing 24h of price
    /// changes, summed over priced positions.
    pub change_24h: Decimal,
    /// 24h movement relative to the derived prior value
    /// (`total_value - change_24h`); 0 unless that prior value is strictly
    /// positive.
    pub change_percentage_24h: Decimal,
}
