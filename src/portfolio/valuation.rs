//! The valuation engine: pure projections from a holdings ledger and a price
//! snapshot to profit/loss statistics.
//!
//! Everything here is synchronous, deterministic and side-effect-free; the
//! inputs are only read. Market data is untrusted, positions may lack a
//! price entry, and cost bases can legitimately be zero (airdrops), so every
//! division sits behind an explicit positivity guard and falls back to zero
//! rather than letting a NaN or misleading sign reach display code.

use rust_decimal::Decimal;

use crate::market_data::PriceSnapshot;
use crate::models::{AssetPosition, Portfolio};

use super::{AssetValuation, PortfolioValuation};

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Value a single position against a snapshot.
///
/// A position with no matching price entry yields the all-zero valuation;
/// it stays in the ledger and the absence is not an error.
pub fn value_asset(position: &AssetPosition, snapshot: &PriceSnapshot) -> AssetValuation {
    let Some(price) = snapshot.get(&position.id) else {
        return AssetValuation::zero();
    };

    let value = position.amount * price.current_price;
    let cost = position.cost_basis();
    let transacted = position.transacted_amount();
    let profit = value - cost;

    let avg_purchase_price = if transacted > Decimal::ZERO {
        Some(cost / transacted)
    } else {
        // Empty (or malformed) history: there is no average to report.
        None
    };

    let profit_percentage = if cost > Decimal::ZERO {
        profit / cost * HUNDRED
    } else {
        Decimal::ZERO
    };

    AssetValuation {
        value,
        cost,
        profit,
        profit_percentage,
        avg_purchase_price,
    }
}

/// Aggregate a whole ledger against a snapshot.
///
/// An empty ledger or empty snapshot short-circuits to the all-zero
/// valuation. Positions without price data contribute nothing to the sums
/// but are not removed from the ledger.
pub fn value_portfolio(portfolio: &Portfolio, snapshot: &PriceSnapshot) -> PortfolioValuation {
    if snapshot.is_empty() || portfolio.assets.is_empty() {
        return PortfolioValuation::default();
    }

    let mut total_value = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    let mut change_24h = Decimal::ZERO;

    for position in &portfolio.assets {
        let Some(price) = snapshot.get(&position.id) else {
            continue;
        };

        let value = position.amount * price.current_price;
        total_value += value;
        total_cost += position.cost_basis();

        let previous_value = position.amount * (price.current_price - price.price_change_24h);
        change_24h += value - previous_value;
    }

    let total_profit = total_value - total_cost;

    let total_profit_percentage = if total_cost > Decimal::ZERO {
        total_profit / total_cost * HUNDRED
    } else {
        Decimal::ZERO
    };

    // Derived prior value. It can be zero or negative in constructed cases
    // (portfolio that lost 100%+ in a day); a percentage against those is
    // meaningless, so report 0.
    let previous_total = total_value - change_24h;
    let change_percentage_24h = if previous_total > Decimal::ZERO {
        change_24h / previous_total * HUNDRED
    } else {
        Decimal::ZERO
    };

    PortfolioValuation {
        total_value,
        total_cost,
        total_profit,
        total_profit_percentage,
        change_24h,
        change_percentage_24h,
    }
}
