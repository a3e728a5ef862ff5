use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single buy recorded against a position.
///
/// Immutable once created; a position's history is append-only and keeps
/// insertion order, which is the order purchases were recorded (a backdated
/// timestamp does not move an entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    /// Quantity of the asset acquired.
    pub amount: Decimal,
    /// Cost per unit in the reference currency, fixed at purchase time.
    pub unit_price: Decimal,
}

impl Transaction {
    pub fn new(timestamp: DateTime<Utc>, amount: Decimal, unit_price: Decimal) -> Self {
        Self {
            timestamp,
            amount,
            unit_price,
        }
    }

    /// Total paid for this purchase.
    pub fn cost(&self) -> Decimal {
        self.amount * self.unit_price
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("purchase amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("unit price cannot be negative, got {0}")]
    NegativeUnitPrice(Decimal),
}

/// A purchase submitted by the user, validated before it touches the ledger.
///
/// The caller resolves display metadata (name/symbol) from market data; the
/// ledger stores it verbatim for presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub asset_id: String,
    pub name: String,
    pub symbol: String,
    pub amount: Decimal,
    pub unit_price: Decimal,
}

impl NewPurchase {
    pub fn validate(&self) -> Result<(), PurchaseError> {
        if self.amount <= Decimal::ZERO {
            return Err(PurchaseError::NonPositiveAmount(self.amount));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(PurchaseError::NegativeUnitPrice(self.unit_price));
        }
        Ok(())
    }
}
