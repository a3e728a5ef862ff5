use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Transaction;

/// A single asset's aggregated holding plus its purchase history.
///
/// `amount` always equals the sum of `transactions[..].amount`; the mutation
/// logic on [`Portfolio`](super::Portfolio) is the only thing that changes
/// either, and it changes both together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPosition {
    /// Stable asset identifier, matching the price provider's id
    /// (e.g. "bitcoin"). A position whose id has no price entry still lives
    /// in the ledger; it just values to zero.
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub amount: Decimal,
    pub transactions: Vec<Transaction>,
}

impl AssetPosition {
    /// Sum of recorded purchase amounts. Equal to `amount` by invariant.
    pub fn transacted_amount(&self) -> Decimal {
        self.transactions.iter().map(|tx| tx.amount).sum()
    }

    /// Total paid across the purchase history (cost basis).
    pub fn cost_basis(&self) -> Decimal {
        self.transactions.iter().map(Transaction::cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn cost_basis_sums_amount_times_unit_price() {
        let position = AssetPosition {
            id: "bitcoin".to_string(),
            name: "Bitcoin".to_string(),
            symbol: "btc".to_string(),
            amount: Decimal::ONE,
            transactions: vec![
                Transaction::new(Utc::now(), Decimal::new(6, 1), Decimal::new(40000, 0)),
                Transaction::new(Utc::now(), Decimal::new(4, 1), Decimal::new(50000, 0)),
            ],
        };

        assert_eq!(position.cost_basis(), Decimal::new(44000, 0));
        assert_eq!(position.transacted_amount(), Decimal::ONE);
    }

    #[test]
    fn empty_history_sums_to_zero() {
        let position = AssetPosition {
            id: "dust".to_string(),
            name: "Dust".to_string(),
            symbol: "dst".to_string(),
            amount: Decimal::ZERO,
            transactions: Vec::new(),
        };

        assert_eq!(position.cost_basis(), Decimal::ZERO);
        assert_eq!(position.transacted_amount(), Decimal::ZERO);
    }
}
