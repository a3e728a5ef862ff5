mod fallback;
mod models;
mod provider;
pub mod providers;
mod service;

pub use fallback::{fallback_global, fallback_history, fallback_snapshot};
pub use models::{AssetPrice, GlobalMarket, HistoryRange, PriceHistory, PricePoint, PriceSnapshot};
pub use provider::PriceProvider;
pub use providers::CoinGeckoProvider;
pub use service::MarketDataService;
