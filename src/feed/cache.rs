//! TTL cache in front of a price source
//!
//! Bounds external call volume: repeated lookups of the same symbol
//! inside the TTL window are served from memory. Only successful
//! lookups are cached — a fetch error is returned to the caller and the
//! next lookup tries the feed again. A cached `None` (symbol known to
//! be unsupported) counts as a successful lookup.

use anyhow::Result;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::trace;

use super::{PriceSource, Quote};

#[derive(Clone)]
struct CacheEntry {
    quote: Option<Quote>,
    fetched_at: Instant,
}

pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Serve the quote from cache or fetch it through `source`
    pub async fn get_or_fetch(
        &self,
        source: &dyn PriceSource,
        symbol: &str,
    ) -> Result<Option<Quote>> {
        let key = symbol.to_uppercase();

        if let Some(entry) = self.entries.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                trace!(symbol = %key, "quote served from cache");
                return Ok(entry.quote.clone());
            }
        }

        let quote = source.quote(symbol).await?;
        self.entries.insert(
            key,
            CacheEntry {
                quote: quote.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(quote)
    }

    /// Drop all cached quotes
    pub fn clear(&self) {
        self.entries.clear();
    }
}
