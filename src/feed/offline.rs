//! Offline feed serving fixed reference prices
//!
//! Backs the `--offline` mode: every quote comes from the universe
//! listing, no network is touched, and there is no price history.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::{Candle, HistoryRange, PriceSource, Quote};
use crate::universe::Universe;

pub struct OfflineFeed {
    // uppercase symbol -> quote
    quotes: HashMap<String, Quote>,
}

impl OfflineFeed {
    pub fn from_universe(universe: &Universe) -> Self {
        let quotes = universe
            .instruments()
            .iter()
            .map(|inst| {
                (
                    inst.symbol.to_uppercase(),
                    Quote {
                        symbol: inst.symbol.clone(),
                        name: Some(inst.name.clone()),
                        price: inst.price,
                    },
                )
            })
            .collect();
        Self { quotes }
    }
}

#[async_trait]
impl PriceSource for OfflineFeed {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        Ok(self.quotes.get(&symbol.to_uppercase()).cloned())
    }

    async fn history(&self, _symbol: &str, _range: HistoryRange) -> Result<Vec<Candle>> {
        // Fixed prices carry no history
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quotes_come_from_the_listing() {
        let feed = OfflineFeed::from_universe(&Universe::builtin());
        let quote = feed.quote("2222.sr").await.unwrap().expect("listed");
        assert_eq!(quote.symbol, "2222.SR");
        assert!(quote.name.is_some());
    }

    #[tokio::test]
    async fn test_unlisted_symbol_is_none() {
        let feed = OfflineFeed::from_universe(&Universe::builtin());
        assert!(feed.quote("AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_empty() {
        let feed = OfflineFeed::from_universe(&Universe::builtin());
        let candles = feed
            .history("2222.SR", HistoryRange::ThreeMonths)
            .await
            .unwrap();
        assert!(candles.is_empty());
    }
}
