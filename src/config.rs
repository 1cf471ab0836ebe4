//! Application configuration
//!
//! Loaded from `paperfolio.yaml` in the data directory when present,
//! otherwise defaults apply. A handful of environment variables override
//! individual fields, which keeps tests and one-off runs simple.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data_paths::DataPaths;

/// Default starting cash balance of a fresh wallet
pub const DEFAULT_STARTING_CASH: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Default quote cache TTL, matching the 15-minute cache of the price feed
pub const DEFAULT_QUOTE_TTL_SECS: u64 = 900;

const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Live quotes from the Yahoo chart API
    Yahoo,
    /// Fixed reference prices from the universe listing, no network
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub kind: FeedKind,
    pub base_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            kind: FeedKind::Yahoo,
            base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub starting_cash: Decimal,
    pub quote_ttl_secs: u64,
    /// Optional JSON listing file; the built-in universe is used when unset
    pub universe_file: Option<PathBuf>,
    pub feed: FeedConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_cash: DEFAULT_STARTING_CASH,
            quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
            universe_file: None,
            feed: FeedConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the config file if present, then apply environment overrides
    pub fn load(data_paths: &DataPaths) -> Result<Self> {
        let path = data_paths.config_file();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("PAPERFOLIO_FEED_URL") {
            self.feed.base_url = url;
        }
        if let Ok(cash) = std::env::var("PAPERFOLIO_STARTING_CASH") {
            self.starting_cash = cash
                .parse()
                .context("PAPERFOLIO_STARTING_CASH must be a decimal number")?;
        }
        if let Ok(ttl) = std::env::var("PAPERFOLIO_QUOTE_TTL_SECS") {
            self.quote_ttl_secs = ttl
                .parse()
                .context("PAPERFOLIO_QUOTE_TTL_SECS must be a number of seconds")?;
        }
        if let Ok(bind) = std::env::var("PAPERFOLIO_BIND") {
            let (host, port) = bind
                .rsplit_once(':')
                .context("PAPERFOLIO_BIND must be host:port")?;
            self.server.host = host.to_string();
            self.server.port = port.parse().context("PAPERFOLIO_BIND port is not a number")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.starting_cash, dec!(100000));
        assert_eq!(config.quote_ttl_secs, 900);
        assert_eq!(config.feed.kind, FeedKind::Yahoo);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let data_paths = DataPaths::new(dir.path());
        let config = AppConfig::load(&data_paths).unwrap();
        assert_eq!(config.starting_cash, DEFAULT_STARTING_CASH);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let data_paths = DataPaths::new(dir.path());
        std::fs::write(
            data_paths.config_file(),
            "starting_cash: 50000\nfeed:\n  kind: offline\n  base_url: http://localhost\n",
        )
        .unwrap();

        let config = AppConfig::load(&data_paths).unwrap();
        assert_eq!(config.starting_cash, dec!(50000));
        assert_eq!(config.feed.kind, FeedKind::Offline);
        // untouched fields keep their defaults
        assert_eq!(config.quote_ttl_secs, DEFAULT_QUOTE_TTL_SECS);
        assert_eq!(config.server.port, 8080);
    }
}
