use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market_data::PriceSnapshot;
use crate::models::Portfolio;

/// Largest positions shown individually; the rest fold into "Others".
pub const TOP_ALLOCATION_SLICES: usize = 5;

/// One slice of the allocation breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub id: String,
    pub name: String,
    pub value: Decimal,
}

/// Group per-asset current values for an allocation breakdown.
///
/// Positions are valued against the snapshot (unpriced ones at zero), sorted
/// descending by value, and the top [`TOP_ALLOCATION_SLICES`] kept. The
/// remainder is summed into a synthetic "Others" slice, emitted only when
/// that sum is positive. Ties keep ledger order (stable sort), so output is
/// deterministic for a fixed input order.
pub fn top_allocations(portfolio: &Portfolio, snapshot: &PriceSnapshot) -> Vec<AllocationSlice> {
    let mut slices: Vec<AllocationSlice> = portfolio
        .assets
        .iter()
        .map(|position| {
            let value = snapshot
                .get(&position.id)
                .map(|price| position.amount * price.current_price)
                .unwrap_or(Decimal::ZERO);
            AllocationSlice {
                id: position.id.clone(),
                name: position.name.clone(),
                value,
            }
        })
        .collect();

    slices.sort_by(|a, b| b.value.cmp(&a.value));

    let rest = slices.split_off(slices.len().min(TOP_ALLOCATION_SLICES));
    let others: Decimal = rest.iter().map(|s| s.value).sum();
    if others > Decimal::ZERO {
        slices.push(AllocationSlice {
            id: "others".to_string(),
            name: "Others".to_string(),
            value: others,
        });
    }

    slices
}
