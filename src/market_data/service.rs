use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::{
    fallback_global, fallback_history, fallback_snapshot, GlobalMarket, HistoryRange, PriceHistory,
    PriceProvider, PriceSnapshot,
};

const DEFAULT_TOP_COINS: usize = 250;

/// Front door for market data.
///
/// Wraps a [`PriceProvider`] and absorbs its failures: a failed fetch is
/// logged and answered with the deterministic fallback data, so callers
/// always get a well-formed snapshot or history and never see a provider
/// error. Stale data beats no data for a tracker.
pub struct MarketDataService {
    provider: Arc<dyn PriceProvider>,
    top_coins: usize,
}

impl MarketDataService {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            provider,
            top_coins: DEFAULT_TOP_COINS,
        }
    }

    /// How many top-market-cap assets to request per snapshot.
    pub fn with_top_coins(mut self, top_coins: usize) -> Self {
        self.top_coins = top_coins;
        self
    }

    pub async fn snapshot(&self) -> PriceSnapshot {
        match self.provider.fetch_market_snapshot(self.top_coins).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Price fetch failed, using fallback data");
                fallback_snapshot(Utc::now())
            }
        }
    }

    pub async fn history(&self, asset_id: &str, range: HistoryRange) -> PriceHistory {
        match self.provider.fetch_price_history(asset_id, range).await {
            Ok(history) => history,
            Err(e) => {
                warn!(provider = self.provider.name(), asset_id, error = %e, "History fetch failed, using fallback data");
                fallback_history(asset_id, range, Utc::now())
            }
        }
    }

    pub async fn global_market(&self) -> GlobalMarket {
        match self.provider.fetch_global_market().await {
            Ok(global) => global,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Global market fetch failed, using fallback data");
                fallback_global()
            }
        }
    }
}
