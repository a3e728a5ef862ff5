use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current market metrics for one asset, as reported by the price provider.
///
/// `name`/`symbol`/`image` are display passthrough; the valuation engine only
/// reads the numeric fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPrice {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub current_price: Decimal,
    /// Absolute change in the reference currency over the trailing 24 hours.
    pub price_change_24h: Decimal,
    pub price_change_percentage_24h: Decimal,
}

/// An immutable view of the market for a set of assets.
///
/// A refresh builds a whole new snapshot; nothing ever updates one in place.
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    fetched_at: DateTime<Utc>,
    prices: HashMap<String, AssetPrice>,
}

impl PriceSnapshot {
    /// Builds a snapshot from provider rows. Later duplicates of an id win,
    /// keeping ids unique within the snapshot.
    pub fn new(fetched_at: DateTime<Utc>, prices: Vec<AssetPrice>) -> Self {
        Self {
            fetched_at,
            prices: prices.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            prices: HashMap::new(),
        }
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, asset_id: &str) -> Option<&AssetPrice> {
        self.prices.get(asset_id)
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }
}

/// Market-wide overview figures: total capitalization, volume, and the
/// BTC/ETH share of the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMarket {
    pub total_market_cap: Decimal,
    pub total_volume: Decimal,
    pub market_cap_change_percentage_24h: Decimal,
    pub btc_dominance: Decimal,
    pub eth_dominance: Decimal,
}

/// Lookback window for historical price queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRange {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl HistoryRange {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "1d" | "day" => Ok(Self::Day),
            "7d" | "week" => Ok(Self::Week),
            "30d" | "month" => Ok(Self::Month),
            "90d" | "quarter" => Ok(Self::Quarter),
            "1y" | "365d" | "year" => Ok(Self::Year),
            _ => anyhow::bail!("Invalid range: {value}. Use: 1d, 7d, 30d, 90d, 1y"),
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "1d",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
        }
    }
}

/// One historical price sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Time-ordered price samples for one asset over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub asset_id: String,
    pub range: HistoryRange,
    pub points: Vec<PricePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(id: &str, current: Decimal) -> AssetPrice {
        AssetPrice {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_string(),
            image: None,
            current_price: current,
            price_change_24h: Decimal::ZERO,
            price_change_percentage_24h: Decimal::ZERO,
        }
    }

    #[test]
    fn snapshot_indexes_by_id_and_keeps_latest_duplicate() {
        let snapshot = PriceSnapshot::new(
            Utc::now(),
            vec![
                price("bitcoin", Decimal::new(1, 0)),
                price("ethereum", Decimal::new(2, 0)),
                price("bitcoin", Decimal::new(3, 0)),
            ],
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get("bitcoin").unwrap().current_price,
            Decimal::new(3, 0)
        );
        assert!(snapshot.get("dogecoin").is_none());
    }

    #[test]
    fn range_parses_aliases_and_rejects_garbage() {
        assert_eq!(HistoryRange::parse("1d").unwrap(), HistoryRange::Day);
        assert_eq!(HistoryRange::parse("WEEK").unwrap(), HistoryRange::Week);
        assert_eq!(HistoryRange::parse("90d").unwrap(), HistoryRange::Quarter);
        assert_eq!(HistoryRange::parse("1y").unwrap(), HistoryRange::Year);
        assert!(HistoryRange::parse("2w").is_err());
    }

    #[test]
    fn range_days_match_selectors() {
        assert_eq!(HistoryRange::Day.days(), 1);
        assert_eq!(HistoryRange::Year.days(), 365);
    }
}
