//! Trading desk: orchestration shared by the CLI and the HTTP API
//!
//! Splits every trade into two phases: resolve the symbol and fetch a
//! price (unlocked, cached, possibly slow), then send the validated
//! mutation to the wallet actor (serialized, fast). The actor never
//! waits on the network.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::errors::TradeError;
use crate::feed::{Candle, HistoryRange, PriceSource, QuoteCache};
use crate::ledger::{LedgerSnapshot, TradeRecord};
use crate::service::WalletHandle;
use crate::universe::Universe;
use crate::valuation::ValuationReport;

/// How many quote fetches may run at once when pricing a whole listing
const QUOTE_CONCURRENCY: usize = 8;

/// One row of the tradable-universe listing, priced if possible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    pub name: String,
    /// None when no quote could be fetched right now
    pub price: Option<Decimal>,
}

pub struct TradingDesk {
    universe: Arc<Universe>,
    feed: Arc<dyn PriceSource>,
    cache: QuoteCache,
    wallet: WalletHandle,
}

impl TradingDesk {
    pub fn new(
        universe: Arc<Universe>,
        feed: Arc<dyn PriceSource>,
        wallet: WalletHandle,
        quote_ttl: Duration,
    ) -> Self {
        Self {
            universe,
            feed,
            cache: QuoteCache::new(quote_ttl),
            wallet,
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Resolve a tradable symbol to its canonical ticker and a current
    /// price. Runs before the wallet actor is touched.
    async fn resolve_execution_price(&self, symbol: &str) -> Result<(String, Decimal), TradeError> {
        let Some(instrument) = self.universe.lookup(symbol) else {
            return Err(TradeError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        };
        let canonical = instrument.symbol.clone();

        match self.cache.get_or_fetch(self.feed.as_ref(), &canonical).await {
            Ok(Some(quote)) => Ok((canonical, quote.price)),
            Ok(None) => Err(TradeError::PriceUnavailable { symbol: canonical }),
            Err(e) => {
                warn!(symbol = %canonical, "quote fetch failed: {e:#}");
                Err(TradeError::PriceUnavailable { symbol: canonical })
            }
        }
    }

    pub async fn buy(&self, symbol: &str, quantity: u64) -> Result<TradeRecord, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let (symbol, price) = self.resolve_execution_price(symbol).await?;
        self.wallet.buy(&symbol, quantity, price).await
    }

    pub async fn sell(&self, symbol: &str, quantity: u64) -> Result<TradeRecord, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let (symbol, price) = self.resolve_execution_price(symbol).await?;
        self.wallet.sell(&symbol, quantity, price).await
    }

    /// The whole universe with current prices where available, in
    /// listing order
    pub async fn listings(&self) -> Vec<StockListing> {
        stream::iter(self.universe.instruments().to_vec())
            .map(|instrument| async move {
                let price = match self
                    .cache
                    .get_or_fetch(self.feed.as_ref(), &instrument.symbol)
                    .await
                {
                    Ok(quote) => quote.map(|q| q.price),
                    Err(e) => {
                        warn!(symbol = %instrument.symbol, "listing quote failed: {e:#}");
                        None
                    }
                };
                StockListing {
                    symbol: instrument.symbol,
                    name: instrument.name,
                    price,
                }
            })
            .buffered(QUOTE_CONCURRENCY)
            .collect()
            .await
    }

    /// Snapshot the wallet and value it against current prices.
    ///
    /// A symbol whose quote cannot be fetched is left out of the report
    /// rows and totals; the report lists it as skipped.
    pub async fn wallet_report(&self) -> Result<(LedgerSnapshot, ValuationReport)> {
        let snapshot = self.wallet.snapshot().await?;

        let symbols: Vec<String> = snapshot.positions.keys().cloned().collect();
        let prices: HashMap<String, Decimal> = stream::iter(symbols)
            .map(|symbol| async move {
                let price = match self.cache.get_or_fetch(self.feed.as_ref(), &symbol).await {
                    Ok(quote) => quote.map(|q| q.price),
                    Err(e) => {
                        warn!(%symbol, "valuation quote failed: {e:#}");
                        None
                    }
                };
                (symbol, price)
            })
            .buffered(QUOTE_CONCURRENCY)
            .filter_map(|(symbol, price)| async move { price.map(|p| (symbol, p)) })
            .collect()
            .await;

        let report = ValuationReport::compute(&snapshot, &prices);
        Ok((snapshot, report))
    }

    /// Daily close history for a listed symbol. Feed trouble degrades
    /// to an empty series, it never fails the caller.
    pub async fn history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<Candle>, TradeError> {
        let Some(instrument) = self.universe.lookup(symbol) else {
            return Err(TradeError::UnknownSymbol {
                symbol: symbol.to_string(),
            });
        };

        match self.feed.history(&instrument.symbol, range).await {
            Ok(candles) => Ok(candles),
            Err(e) => {
                warn!(symbol = %instrument.symbol, "history fetch failed: {e:#}");
                Ok(Vec::new())
            }
        }
    }

    /// The append-only trade log, oldest first
    pub async fn trade_log(&self) -> Result<Vec<TradeRecord>> {
        self.wallet.history().await
    }
}
