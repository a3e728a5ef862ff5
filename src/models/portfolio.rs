use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AssetPosition, NewPurchase, Transaction};

/// The holdings ledger: the single source of truth for what the user owns.
///
/// Mutations are whole-value updates (`with_purchase` / `without_asset`)
/// rather than in-place edits, so a ledger value handed to the valuation
/// engine can never change underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub name: String,
    pub assets: Vec<AssetPosition>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assets: Vec::new(),
        }
    }

    pub fn position(&self, asset_id: &str) -> Option<&AssetPosition> {
        self.assets.iter().find(|p| p.id == asset_id)
    }

    /// Record a purchase, returning the updated ledger.
    ///
    /// An existing position for the asset gets its amount bumped and one
    /// transaction appended; everything else is preserved. A new asset id
    /// appends a position with a single-entry history. Either way the
    /// position amount stays equal to the sum of its transaction amounts.
    ///
    /// The purchase is assumed validated ([`NewPurchase::validate`]); callers
    /// reject bad input before it reaches the ledger.
    pub fn with_purchase(&self, purchase: &NewPurchase, now: DateTime<Utc>) -> Portfolio {
        let tx = Transaction::new(now, purchase.amount, purchase.unit_price);
        let mut updated = self.clone();

        match updated.assets.iter_mut().find(|p| p.id == purchase.asset_id) {
            Some(position) => {
                position.amount += purchase.amount;
                position.transactions.push(tx);
            }
            None => {
                updated.assets.push(AssetPosition {
                    id: purchase.asset_id.clone(),
                    name: purchase.name.clone(),
                    symbol: purchase.symbol.clone(),
                    amount: purchase.amount,
                    transactions: vec![tx],
                });
            }
        }

        updated
    }

    /// Drop the position with the given id, if present. Removing an absent
    /// id is a no-op, not an error.
    pub fn without_asset(&self, asset_id: &str) -> Portfolio {
        Portfolio {
            name: self.name.clone(),
            assets: self
                .assets
                .iter()
                .filter(|p| p.id != asset_id)
                .cloned()
                .collect(),
        }
    }

    /// Built-in starter portfolio used when nothing has been persisted yet.
    pub fn sample() -> Self {
        fn tx(ts: DateTime<Utc>, amount: Decimal, unit_price: Decimal) -> Transaction {
            Transaction::new(ts, amount, unit_price)
        }

        fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
                .single()
                .expect("valid sample timestamp")
        }

        Portfolio {
            name: "My Crypto Portfolio".to_string(),
            assets: vec![
                AssetPosition {
                    id: "bitcoin".to_string(),
                    name: "Bitcoin".to_string(),
                    symbol: "btc".to_string(),
                    amount: Decimal::new(5, 1),
                    transactions: vec![
                        tx(at(2023, 1, 15, 12, 0), Decimal::new(3, 1), Decimal::new(42000, 0)),
                        tx(at(2023, 3, 20, 15, 30), Decimal::new(2, 1), Decimal::new(38000, 0)),
                    ],
                },
                AssetPosition {
                    id: "ethereum".to_string(),
                    name: "Ethereum".to_string(),
                    symbol: "eth".to_string(),
                    amount: Decimal::new(32, 1),
                    transactions: vec![
                        tx(at(2023, 2, 10, 9, 15), Decimal::new(2, 0), Decimal::new(2800, 0)),
                        tx(at(2023, 4, 5, 14, 45), Decimal::new(12, 1), Decimal::new(3100, 0)),
                    ],
                },
                AssetPosition {
                    id: "solana".to_string(),
                    name: "Solana".to_string(),
                    symbol: "sol".to_string(),
                    amount: Decimal::new(25, 0),
                    transactions: vec![
                        tx(at(2023, 3, 1, 10, 30), Decimal::new(15, 0), Decimal::new(95, 0)),
                        tx(at(2023, 5, 12, 16, 20), Decimal::new(10, 0), Decimal::new(110, 0)),
                    ],
                },
                AssetPosition {
                    id: "cardano".to_string(),
                    name: "Cardano".to_string(),
                    symbol: "ada".to_string(),
                    amount: Decimal::new(1000, 0),
                    transactions: vec![
                        tx(at(2023, 2, 20, 11, 45), Decimal::new(600, 0), Decimal::new(45, 2)),
                        tx(at(2023, 4, 15, 13, 10), Decimal::new(400, 0), Decimal::new(52, 2)),
                    ],
                },
                AssetPosition {
                    id: "polkadot".to_string(),
                    name: "Polkadot".to_string(),
                    symbol: "dot".to_string(),
                    amount: Decimal::new(120, 0),
                    transactions: vec![
                        tx(at(2023, 1, 25, 8, 30), Decimal::new(70, 0), Decimal::new(68, 1)),
                        tx(at(2023, 3, 30, 17, 0), Decimal::new(50, 0), Decimal::new(72, 1)),
                    ],
                },
            ],
        }
    }
}
