use anyhow::Result;

use super::{GlobalMarket, HistoryRange, PriceHistory, PriceSnapshot};

/// A live market data source.
///
/// Implementations may fail (network, rate limits); callers that must always
/// hand the valuation engine a well-formed snapshot go through
/// [`MarketDataService`](super::MarketDataService), which degrades to the
/// built-in fallback instead of propagating errors.
#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch current market metrics for the top `limit` assets by market cap.
    async fn fetch_market_snapshot(&self, limit: usize) -> Result<PriceSnapshot>;

    /// Fetch a time-ordered price series for one asset over `range`.
    async fn fetch_price_history(&self, asset_id: &str, range: HistoryRange)
        -> Result<PriceHistory>;

    /// Fetch the market-wide overview (total cap, volume, dominance).
    async fn fetch_global_market(&self) -> Result<GlobalMarket>;

    fn name(&self) -> &str;
}
