use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::duration::deserialize_duration;

/// Default quote currency for prices and valuations.
fn default_quote_currency() -> String {
    "usd".to_string()
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// If set, quote-currency values are rounded to this many decimal places
    /// before being rendered as strings.
    ///
    /// This is purely a presentation setting and does not affect calculations.
    pub currency_decimals: Option<u32>,

    /// When true, render quote-currency values with thousands separators.
    pub currency_grouping: bool,

    /// Optional currency symbol (e.g. "$", "€") for display rendering.
    pub currency_symbol: Option<String>,

    /// When true and `currency_decimals` is set, display values with exactly
    /// that many decimal places (padding with trailing zeros).
    pub currency_fixed_decimals: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_decimals: Some(2),
            currency_grouping: true,
            currency_symbol: Some("$".to_string()),
            currency_fixed_decimals: true,
        }
    }
}

/// Default market refresh interval (2 minutes).
fn default_refresh_interval() -> std::time::Duration {
    std::time::Duration::from_secs(2 * 60)
}

/// How many coins to request per market snapshot.
fn default_top_coins() -> usize {
    250
}

/// Market data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Number of top-ranked coins included in each price snapshot.
    #[serde(default = "default_top_coins")]
    pub top_coins: usize,

    /// How often the watch mode re-fetches prices.
    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh_interval: std::time::Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            top_coins: default_top_coins(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to data directory. If relative, resolved from config file location.
    /// If not specified, defaults to the config file's directory.
    pub data_dir: Option<PathBuf>,

    /// Quote currency for prices and valuations (e.g., "usd")
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Display/output formatting settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Market data settings.
    #[serde(default)]
    pub market: MarketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            quote_currency: default_quote_currency(),
            display: DisplayConfig::default(),
            market: MarketConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the data directory path.
    ///
    /// If `data_dir` is set and relative, it's resolved relative to `config_dir`.
    /// If `data_dir` is not set, returns `config_dir`.
    pub fn resolve_data_dir(&self, config_dir: &Path) -> PathBuf {
        match &self.data_dir {
            Some(data_dir) if data_dir.is_absolute() => data_dir.clone(),
            Some(data_dir) => config_dir.join(data_dir),
            None => config_dir.to_path_buf(),
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved data directory path.
    pub data_dir: PathBuf,

    /// Quote currency for prices and valuations (e.g., "usd")
    pub quote_currency: String,

    /// Display/output formatting settings.
    pub display: DisplayConfig,

    /// Market data settings.
    pub market: MarketConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./cryptofolio.toml` if it exists in current directory
/// 2. `~/.local/share/cryptofolio/cryptofolio.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("cryptofolio.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("cryptofolio").join("cryptofolio.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The data directory is resolved relative to the config file's parent
    /// directory. A missing config file yields the defaults, with data stored
    /// alongside where the config file would live.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        let config_dir = match config_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let data_dir = config.resolve_data_dir(&config_dir);

        Ok(Self {
            data_dir,
            quote_currency: config.quote_currency,
            display: config.display,
            market: config.market,
        })
    }
}
