//! Price feed abstraction
//!
//! The ledger never talks to a feed directly; the trading desk resolves
//! prices through this trait and hands the ledger an execution price.

mod cache;
mod offline;
mod yahoo;

pub use cache::QuoteCache;
pub use offline::OfflineFeed;
pub use yahoo::YahooFeed;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::{AppConfig, FeedKind};
use crate::universe::Universe;

/// Current reference price for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Decimal,
}

/// One point of a daily close series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

/// History window accepted by `PriceSource::history`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl HistoryRange {
    /// Yahoo chart API `range` parameter value
    pub fn as_query(&self) -> &'static str {
        match self {
            HistoryRange::OneMonth => "1mo",
            HistoryRange::ThreeMonths => "3mo",
            HistoryRange::SixMonths => "6mo",
            HistoryRange::OneYear => "1y",
        }
    }
}

impl FromStr for HistoryRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1mo" => Ok(HistoryRange::OneMonth),
            "3mo" => Ok(HistoryRange::ThreeMonths),
            "6mo" => Ok(HistoryRange::SixMonths),
            "1y" => Ok(HistoryRange::OneYear),
            other => anyhow::bail!("unsupported history range: {other} (use 1mo|3mo|6mo|1y)"),
        }
    }
}

impl std::fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// External provider of current and historical prices.
///
/// `Ok(None)` from `quote` means the symbol is unsupported or the price
/// is temporarily unavailable; callers degrade, they do not crash.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Daily close series, empty when the symbol is unknown
    async fn history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Candle>>;
}

/// Build the configured feed implementation
pub fn build_feed(config: &AppConfig, universe: &Universe) -> Result<Arc<dyn PriceSource>> {
    match config.feed.kind {
        FeedKind::Yahoo => Ok(Arc::new(YahooFeed::new(&config.feed.base_url)?)),
        FeedKind::Offline => Ok(Arc::new(OfflineFeed::from_universe(universe))),
    }
}
