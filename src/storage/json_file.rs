use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::Portfolio;

use super::PortfolioStore;

/// JSON file-based portfolio storage.
///
/// The ledger lives in a single `portfolio.json` under the data directory;
/// it is small and rewritten whole on every save.
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn portfolio_file(&self) -> PathBuf {
        self.base_path.join("portfolio.json")
    }
}

#[async_trait::async_trait]
impl PortfolioStore for JsonFileStorage {
    async fn load(&self) -> Result<Option<Portfolio>> {
        let path = self.portfolio_file();
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let portfolio = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
                Ok(Some(portfolio))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read portfolio file"),
        }
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<()> {
        let path = self.portfolio_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create data directory")?;
        }

        let content =
            serde_json::to_string_pretty(portfolio).context("Failed to serialize portfolio")?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_returns_none_when_nothing_saved() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.load().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());

        let portfolio = Portfolio::sample();
        storage.save(&portfolio).await?;

        let loaded = storage.load().await?.expect("portfolio should exist");
        assert_eq!(loaded, portfolio);
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_missing_data_directory() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path().join("nested").join("data"));

        storage.save(&Portfolio::sample()).await?;
        assert!(storage.load().await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn load_rejects_corrupt_json() -> Result<()> {
        let dir = TempDir::new()?;
        let storage = JsonFileStorage::new(dir.path());

        tokio::fs::write(dir.path().join("portfolio.json"), "{not json").await?;
        assert!(storage.load().await.is_err());
        Ok(())
    }
}
