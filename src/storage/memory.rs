//! In-memory storage implementation for testing.

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::Portfolio;

use super::PortfolioStore;

/// In-memory portfolio store for tests.
pub struct MemoryStorage {
    portfolio: Mutex<Option<Portfolio>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            portfolio: Mutex::new(None),
        }
    }

    pub fn with_portfolio(portfolio: Portfolio) -> Self {
        Self {
            portfolio: Mutex::new(Some(portfolio)),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PortfolioStore for MemoryStorage {
    async fn load(&self) -> Result<Option<Portfolio>> {
        Ok(self.portfolio.lock().await.clone())
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<()> {
        *self.portfolio.lock().await = Some(portfolio.clone());
        Ok(())
    }
}
