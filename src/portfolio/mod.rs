mod allocation;
mod models;
mod service;
mod valuation;

pub use allocation::{top_allocations, AllocationSlice, TOP_ALLOCATION_SLICES};
pub use models::{AssetValuation, PortfolioValuation};
pub use service::PortfolioService;
pub use valuation::{value_asset, value_portfolio};
