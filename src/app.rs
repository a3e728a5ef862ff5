use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::config::ResolvedConfig;
use crate::format::{
    format_currency_display, format_currency_value, format_percent, format_share_percent,
};
use crate::market_data::{
    CoinGeckoProvider, GlobalMarket, HistoryRange, MarketDataService, PriceSnapshot,
};
use crate::models::{NewPurchase, Portfolio};
use crate::portfolio::{
    top_allocations, value_asset, value_portfolio, PortfolioService,
};
use crate::storage::{JsonFileStorage, PortfolioStore};

/// JSON output for one held asset in the summary.
#[derive(Serialize)]
pub struct AssetRowOutput {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub amount: String,
    pub price: Option<String>,
    pub value: String,
    pub cost: String,
    pub profit: String,
    pub profit_percentage: String,
    pub avg_purchase_price: Option<String>,
    pub change_percentage_24h: Option<String>,
}

/// JSON output for the market-wide overview.
#[derive(Serialize)]
pub struct GlobalMarketOutput {
    pub total_market_cap: String,
    pub total_volume: String,
    pub market_cap_change_percentage_24h: String,
    pub btc_dominance: String,
    pub eth_dominance: String,
}

/// JSON output for the portfolio summary.
#[derive(Serialize)]
pub struct SummaryOutput {
    pub portfolio: String,
    pub prices_fetched_at: String,
    pub total_value: String,
    pub total_cost: String,
    pub total_profit: String,
    pub total_profit_percentage: String,
    pub change_24h: String,
    pub change_percentage_24h: String,
    pub market: GlobalMarketOutput,
    pub assets: Vec<AssetRowOutput>,
}

/// JSON output for one allocation slice.
#[derive(Serialize)]
pub struct AllocationSliceOutput {
    pub id: String,
    pub name: String,
    pub value: String,
    pub share_percentage: String,
}

/// JSON output for the allocation breakdown.
#[derive(Serialize)]
pub struct AllocationOutput {
    pub portfolio: String,
    pub total_value: String,
    pub slices: Vec<AllocationSliceOutput>,
}

/// JSON output for one price history point.
#[derive(Serialize)]
pub struct HistoryPointOutput {
    pub timestamp: String,
    pub price: String,
}

/// JSON output for a price history query.
#[derive(Serialize)]
pub struct HistoryOutput {
    pub asset_id: String,
    pub range: String,
    pub points: Vec<HistoryPointOutput>,
}

/// Application entry point wiring config, storage, market data and the
/// portfolio service together for the CLI commands.
pub struct App {
    config: ResolvedConfig,
    service: PortfolioService,
}

impl App {
    pub fn new(config: ResolvedConfig) -> Self {
        let provider = CoinGeckoProvider::new().with_quote_currency(&config.quote_currency);
        let market_data = Arc::new(
            MarketDataService::new(Arc::new(provider)).with_top_coins(config.market.top_coins),
        );
        let storage: Arc<dyn PortfolioStore> = Arc::new(JsonFileStorage::new(&config.data_dir));
        Self::with_parts(config, storage, market_data)
    }

    /// Assemble from pre-built parts. Used by tests to substitute stores and
    /// providers.
    pub fn with_parts(
        config: ResolvedConfig,
        storage: Arc<dyn PortfolioStore>,
        market_data: Arc<MarketDataService>,
    ) -> Self {
        let service = PortfolioService::new(storage, market_data);
        Self { config, service }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Refresh prices and compute the portfolio summary.
    pub async fn summary(&self) -> Result<SummaryOutput> {
        let ledger = self.service.ledger().await?;
        Ok(self.refreshed_summary(&ledger).await)
    }

    /// Record a purchase and return the refreshed summary.
    pub async fn add(&self, purchase: &NewPurchase) -> Result<SummaryOutput> {
        let ledger = self.service.add_purchase(purchase).await?;
        info!(asset = %purchase.asset_id, amount = %purchase.amount, "Recorded purchase");
        Ok(self.refreshed_summary(&ledger).await)
    }

    /// Remove a position and return the refreshed summary.
    pub async fn remove(&self, asset_id: &str) -> Result<SummaryOutput> {
        let ledger = self.service.remove_asset(asset_id).await?;
        Ok(self.refreshed_summary(&ledger).await)
    }

    async fn refreshed_summary(&self, ledger: &Portfolio) -> SummaryOutput {
        self.service.refresh_prices().await;
        let snapshot = self.service.snapshot().await;
        let global = self.service.market_data().global_market().await;
        self.build_summary(ledger, &snapshot, &global)
    }

    /// Refresh prices and compute the allocation breakdown.
    pub async fn allocation(&self) -> Result<AllocationOutput> {
        self.service.refresh_prices().await;
        let ledger = self.service.ledger().await?;
        let snapshot = self.service.snapshot().await;

        let dp = self.config.display.currency_decimals;
        let slices = top_allocations(&ledger, &snapshot);
        let total: rust_decimal::Decimal = slices.iter().map(|s| s.value).sum();

        let slices = slices
            .into_iter()
            .map(|slice| {
                let share = if total > rust_decimal::Decimal::ZERO {
                    slice.value / total * rust_decimal::Decimal::ONE_HUNDRED
                } else {
                    rust_decimal::Decimal::ZERO
                };
                AllocationSliceOutput {
                    id: slice.id,
                    name: slice.name,
                    value: format_currency_value(slice.value, dp),
                    share_percentage: format_percent(share),
                }
            })
            .collect();

        Ok(AllocationOutput {
            portfolio: ledger.name,
            total_value: format_currency_value(total, dp),
            slices,
        })
    }

    /// Fetch the price history for one asset.
    pub async fn history(&self, asset_id: &str, range: HistoryRange) -> Result<HistoryOutput> {
        let history = self.service.market_data().history(asset_id, range).await;
        let dp = self.config.display.currency_decimals;
        Ok(HistoryOutput {
            asset_id: history.asset_id,
            range: range.as_str().to_string(),
            points: history
                .points
                .into_iter()
                .map(|point| HistoryPointOutput {
                    timestamp: point.timestamp.to_rfc3339(),
                    price: format_currency_value(point.price, dp),
                })
                .collect(),
        })
    }

    fn build_summary(
        &self,
        ledger: &Portfolio,
        snapshot: &PriceSnapshot,
        global: &GlobalMarket,
    ) -> SummaryOutput {
        let dp = self.config.display.currency_decimals;
        let totals = value_portfolio(ledger, snapshot);

        let assets = ledger
            .assets
            .iter()
            .map(|position| {
                let valuation = value_asset(position, snapshot);
                let price = snapshot.get(&position.id);
                AssetRowOutput {
                    id: position.id.clone(),
                    name: position.name.clone(),
                    symbol: position.symbol.clone(),
                    amount: position.amount.normalize().to_string(),
                    price: price.map(|p| format_currency_value(p.current_price, dp)),
                    value: format_currency_value(valuation.value, dp),
                    cost: format_currency_value(valuation.cost, dp),
                    profit: format_currency_value(valuation.profit, dp),
                    profit_percentage: format_percent(valuation.profit_percentage),
                    avg_purchase_price: valuation
                        .avg_purchase_price
                        .map(|avg| format_currency_value(avg, dp)),
                    change_percentage_24h: price
                        .map(|p| format_percent(p.price_change_percentage_24h)),
                }
            })
            .collect();

        SummaryOutput {
            portfolio: ledger.name.clone(),
            prices_fetched_at: snapshot.fetched_at().to_rfc3339(),
            total_value: format_currency_value(totals.total_value, dp),
            total_cost: format_currency_value(totals.total_cost, dp),
            total_profit: format_currency_value(totals.total_profit, dp),
            total_profit_percentage: format_percent(totals.total_profit_percentage),
            change_24h: format_currency_value(totals.change_24h, dp),
            change_percentage_24h: format_percent(totals.change_percentage_24h),
            market: GlobalMarketOutput {
                total_market_cap: format_currency_value(global.total_market_cap, dp),
                total_volume: format_currency_value(global.total_volume, dp),
                market_cap_change_percentage_24h: format_percent(
                    global.market_cap_change_percentage_24h,
                ),
                btc_dominance: format_share_percent(global.btc_dominance),
                eth_dominance: format_share_percent(global.eth_dominance),
            },
            assets,
        }
    }
}

/// Render a summary as a human-readable table.
pub fn render_summary(output: &SummaryOutput, config: &ResolvedConfig) -> String {
    use std::fmt::Write as _;
    use std::str::FromStr;

    let display = &config.display;
    let money = |s: &str| {
        rust_decimal::Decimal::from_str(s)
            .map(|d| format_currency_display(d, display))
            .unwrap_or_else(|_| s.to_string())
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", output.portfolio);
    let _ = writeln!(out, "Prices as of {}", output.prices_fetched_at);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total value:  {}  ({} 24h)",
        money(&output.total_value),
        output.change_percentage_24h
    );
    let _ = writeln!(out, "Total cost:   {}", money(&output.total_cost));
    let _ = writeln!(
        out,
        "Profit:       {}  ({})",
        money(&output.total_profit),
        output.total_profit_percentage
    );
    let _ = writeln!(
        out,
        "Market:       {} cap ({} 24h), {} BTC dominance",
        money(&output.market.total_market_cap),
        output.market.market_cap_change_percentage_24h,
        output.market.btc_dominance
    );
    let _ = writeln!(out);

    for asset in &output.assets {
        let _ = writeln!(
            out,
            "{:<12} {:>16} {:>14} {:>12} {:>10}",
            asset.symbol.to_uppercase(),
            asset.amount,
            money(&asset.value),
            money(&asset.profit),
            asset.profit_percentage,
        );
    }

    out
}

/// Render an allocation breakdown as a human-readable list.
pub fn render_allocation(output: &AllocationOutput, config: &ResolvedConfig) -> String {
    use std::fmt::Write as _;
    use std::str::FromStr;

    let display = &config.display;
    let mut out = String::new();
    let _ = writeln!(out, "{} allocation", output.portfolio);
    for slice in &output.slices {
        let value = rust_decimal::Decimal::from_str(&slice.value)
            .map(|d| format_currency_display(d, display))
            .unwrap_or_else(|_| slice.value.clone());
        let _ = writeln!(
            out,
            "{:<12} {:>16} {:>9}",
            slice.name, value, slice.share_percentage
        );
    }
    out
}
