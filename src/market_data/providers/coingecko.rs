//! CoinGecko market data provider.
//!
//! Uses CoinGecko's free API: `/coins/markets` for the current snapshot of
//! top coins, `/coins/{id}/market_chart` for historical price series, and
//! `/global` for the market-wide overview.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::market_data::{
    AssetPrice, GlobalMarket, HistoryRange, PriceHistory, PricePoint, PriceProvider, PriceSnapshot,
};

const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
const USER_AGENT: &str = "cryptofolio/0.1.0";

/// One row of the `/coins/markets` response. Numeric fields are nullable in
/// the API for thinly-traded coins.
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    image: Option<String>,
    current_price: Option<f64>,
    price_change_24h: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

/// `/coins/{id}/market_chart` response: `[timestamp_ms, price]` pairs.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

/// `/global` response envelope.
#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

/// Payload of `/global`. The cap/volume/dominance maps are keyed by currency
/// (or coin symbol for dominance); the 24h change is only published in USD.
#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    market_cap_percentage: HashMap<String, f64>,
    market_cap_change_percentage_24h_usd: Option<f64>,
}

/// CoinGecko price provider. No API key required; rate limits apply.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    /// Quote currency for prices (e.g. "usd")
    quote_currency: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: COINGECKO_API_BASE.to_string(),
            quote_currency: "usd".to_string(),
        }
    }

    /// Creates a provider with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
            quote_currency: "usd".to_string(),
        }
    }

    /// Overrides the API base URL. Used by tests to point at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_quote_currency(mut self, currency: impl Into<String>) -> Self {
        self.quote_currency = currency.into().to_lowercase();
        self
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinGecko API error: {} - {}", status, body));
        }

        Ok(response.json().await?)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an API float to `Decimal` through its shortest string form.
/// Non-finite or unrepresentable values collapse to zero so they can never
/// leak into valuation math.
fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string()).unwrap_or(Decimal::ZERO)
}

fn global_data_to_market(data: GlobalData, quote_currency: &str) -> GlobalMarket {
    let keyed = |map: &HashMap<String, f64>, key: &str| {
        map.get(key).copied().map(decimal_from_f64).unwrap_or_default()
    };

    GlobalMarket {
        total_market_cap: keyed(&data.total_market_cap, quote_currency),
        total_volume: keyed(&data.total_volume, quote_currency),
        market_cap_change_percentage_24h: data
            .market_cap_change_percentage_24h_usd
            .map(decimal_from_f64)
            .unwrap_or_default(),
        btc_dominance: keyed(&data.market_cap_percentage, "btc"),
        eth_dominance: keyed(&data.market_cap_percentage, "eth"),
    }
}

fn row_to_price(row: MarketRow) -> AssetPrice {
    AssetPrice {
        id: row.id,
        symbol: row.symbol,
        name: row.name,
        image: row.image,
        current_price: row.current_price.map(decimal_from_f64).unwrap_or_default(),
        price_change_24h: row
            .price_change_24h
            .map(decimal_from_f64)
            .unwrap_or_default(),
        price_change_percentage_24h: row
            .price_change_percentage_24h
            .map(decimal_from_f64)
            .unwrap_or_default(),
    }
}

#[async_trait::async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_market_snapshot(&self, limit: usize) -> Result<PriceSnapshot> {
        let url = format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url, self.quote_currency, limit
        );

        let rows: Vec<MarketRow> = self.get_json(&url).await?;
        let prices = rows.into_iter().map(row_to_price).collect();

        Ok(PriceSnapshot::new(Utc::now(), prices))
    }

    async fn fetch_price_history(
        &self,
        asset_id: &str,
        range: HistoryRange,
    ) -> Result<PriceHistory> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.base_url,
            asset_id,
            self.quote_currency,
            range.days()
        );

        let chart: MarketChartResponse = self.get_json(&url).await?;

        let points = chart
            .prices
            .into_iter()
            .filter_map(|(ts_ms, price)| {
                let timestamp = DateTime::<Utc>::from_timestamp_millis(ts_ms as i64)?;
                Some(PricePoint {
                    timestamp,
                    price: decimal_from_f64(price),
                })
            })
            .collect();

        Ok(PriceHistory {
            asset_id: asset_id.to_string(),
            range,
            points,
        })
    }

    async fn fetch_global_market(&self) -> Result<GlobalMarket> {
        let url = format!("{}/global", self.base_url);
        let response: GlobalResponse = self.get_json(&url).await?;
        Ok(global_data_to_market(response.data, &self.quote_currency))
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trimmed `/coins/markets` response for two coins.
    const SAMPLE_MARKETS_RESPONSE: &str = r#"[
        {
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 57000.0,
            "market_cap": 1100000000000,
            "market_cap_rank": 1,
            "price_change_24h": 1400.0,
            "price_change_percentage_24h": 2.5,
            "high_24h": 58000,
            "low_24h": 55500
        },
        {
            "id": "cardano",
            "symbol": "ada",
            "name": "Cardano",
            "image": null,
            "current_price": 0.55,
            "price_change_24h": -0.007,
            "price_change_percentage_24h": -1.2
        }
    ]"#;

    /// Row with null numerics, as returned for illiquid coins.
    const SAMPLE_NULL_PRICE_ROW: &str = r#"{
        "id": "ghostchain",
        "symbol": "ghost",
        "name": "GhostChain",
        "image": null,
        "current_price": null,
        "price_change_24h": null,
        "price_change_percentage_24h": null
    }"#;

    /// Trimmed `/global` response.
    const SAMPLE_GLOBAL_RESPONSE: &str = r#"{
        "data": {
            "active_cryptocurrencies": 10000,
            "total_market_cap": { "usd": 2345678901234.0, "eur": 2160000000000.0 },
            "total_volume": { "usd": 123456789012.0, "eur": 113000000000.0 },
            "market_cap_percentage": { "btc": 42.5, "eth": 18.3 },
            "market_cap_change_percentage_24h_usd": 2.5
        }
    }"#;

    const SAMPLE_MARKET_CHART_RESPONSE: &str = r#"{
        "prices": [
            [1714521600000, 57123.45],
            [1714608000000, 57890.12]
        ],
        "market_caps": [],
        "total_volumes": []
    }"#;

    #[test]
    fn parses_markets_rows() {
        let rows: Vec<MarketRow> = serde_json::from_str(SAMPLE_MARKETS_RESPONSE).unwrap();
        assert_eq!(rows.len(), 2);

        let btc = row_to_price(rows.into_iter().next().unwrap());
        assert_eq!(btc.id, "bitcoin");
        assert_eq!(btc.current_price, Decimal::new(57000, 0));
        assert_eq!(btc.price_change_24h, Decimal::new(1400, 0));
        assert_eq!(btc.price_change_percentage_24h, Decimal::new(25, 1));
    }

    #[test]
    fn parses_negative_fractional_change() {
        let rows: Vec<MarketRow> = serde_json::from_str(SAMPLE_MARKETS_RESPONSE).unwrap();
        let ada = row_to_price(rows.into_iter().nth(1).unwrap());
        assert_eq!(ada.current_price, Decimal::new(55, 2));
        assert_eq!(ada.price_change_24h, Decimal::new(-7, 3));
        assert!(ada.image.is_none());
    }

    #[test]
    fn null_numerics_become_zero() {
        let row: MarketRow = serde_json::from_str(SAMPLE_NULL_PRICE_ROW).unwrap();
        let price = row_to_price(row);
        assert_eq!(price.current_price, Decimal::ZERO);
        assert_eq!(price.price_change_24h, Decimal::ZERO);
        assert_eq!(price.price_change_percentage_24h, Decimal::ZERO);
    }

    #[test]
    fn parses_global_overview_for_the_quote_currency() {
        let response: GlobalResponse = serde_json::from_str(SAMPLE_GLOBAL_RESPONSE).unwrap();
        let global = global_data_to_market(response.data, "usd");

        assert_eq!(global.total_market_cap, Decimal::new(2_345_678_901_234, 0));
        assert_eq!(global.total_volume, Decimal::new(123_456_789_012, 0));
        assert_eq!(global.market_cap_change_percentage_24h, Decimal::new(25, 1));
        assert_eq!(global.btc_dominance, Decimal::new(425, 1));
        assert_eq!(global.eth_dominance, Decimal::new(183, 1));
    }

    #[test]
    fn global_overview_missing_quote_key_zeroes_the_figure() {
        let response: GlobalResponse = serde_json::from_str(SAMPLE_GLOBAL_RESPONSE).unwrap();
        let global = global_data_to_market(response.data, "jpy");

        assert_eq!(global.total_market_cap, Decimal::ZERO);
        assert_eq!(global.total_volume, Decimal::ZERO);
        // Dominance is keyed by coin symbol, not quote currency.
        assert_eq!(global.btc_dominance, Decimal::new(425, 1));
    }

    #[test]
    fn parses_market_chart_pairs() {
        let chart: MarketChartResponse =
            serde_json::from_str(SAMPLE_MARKET_CHART_RESPONSE).unwrap();
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.prices[0].1, 57123.45);
    }

    #[test]
    fn decimal_conversion_collapses_non_finite_values() {
        assert_eq!(decimal_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(decimal_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(decimal_from_f64(57000.0), Decimal::new(57000, 0));
        assert_eq!(decimal_from_f64(-0.007), Decimal::new(-7, 3));
    }

    #[test]
    fn provider_name_and_defaults() {
        let provider = CoinGeckoProvider::default();
        assert_eq!(provider.name(), "coingecko");
        assert_eq!(provider.quote_currency, "usd");
        assert_eq!(provider.base_url, COINGECKO_API_BASE);
    }

    #[test]
    fn quote_currency_is_lowercased() {
        let provider = CoinGeckoProvider::new().with_quote_currency("EUR");
        assert_eq!(provider.quote_currency, "eur");
    }
}
