mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use anyhow::Result;

use crate::models::Portfolio;

/// Storage trait for persisting the holdings ledger.
///
/// A scoped key-value contract: one portfolio in, one portfolio out. The
/// persisted shape is the `models` types verbatim, so a save/load round trip
/// is lossless.
#[async_trait::async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Returns the persisted portfolio, or `None` if nothing has been saved
    /// yet (callers substitute the built-in sample).
    async fn load(&self) -> Result<Option<Portfolio>>;

    async fn save(&self, portfolio: &Portfolio) -> Result<()>;
}
