//! Yahoo Finance chart API client
//!
//! Uses the public v8 chart endpoint for both current quotes and daily
//! close history. The base URL is injectable so tests can point the
//! client at a mock server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use chrono::{TimeZone, Utc};
use rust_decimal::prelude::{Decimal, FromPrimitive};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{Candle, HistoryRange, PriceSource, Quote};

const MAX_ATTEMPTS: u32 = 3;

pub struct YahooFeed {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    #[serde(rename = "longName")]
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<IndicatorQuote>,
}

#[derive(Debug, Deserialize)]
struct IndicatorQuote {
    close: Option<Vec<Option<f64>>>,
}

impl YahooFeed {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid feed base URL: {base_url}"))?;
        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str, range: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("v8/finance/chart/{symbol}"))
            .context("Failed to build chart URL")?;
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// GET with retries on network errors and 5xx responses
    async fn fetch_chart(&self, url: Url) -> Result<Option<ChartResponse>> {
        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            max_elapsed_time: None,
            ..Default::default()
        };

        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        // Yahoo answers 404 for unknown tickers
                        return Ok(None);
                    }
                    if status.is_server_error() {
                        warn!(%url, %status, attempt, "feed returned server error");
                    } else {
                        let parsed = response
                            .error_for_status()
                            .context("Feed request failed")?
                            .json::<ChartResponse>()
                            .await
                            .context("Failed to parse feed response")?;
                        return Ok(Some(parsed));
                    }
                }
                Err(e) => {
                    warn!(%url, attempt, "feed request failed: {e}");
                }
            }

            if attempt < MAX_ATTEMPTS {
                if let Some(delay) = backoff.next_backoff() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        anyhow::bail!("feed unreachable after {MAX_ATTEMPTS} attempts: {url}")
    }
}

#[async_trait]
impl PriceSource for YahooFeed {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = self.chart_url(symbol, "1d")?;
        let Some(response) = self.fetch_chart(url).await? else {
            return Ok(None);
        };

        let Some(result) = response.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) else {
            return Ok(None);
        };

        let raw_price = result
            .meta
            .regular_market_price
            .or(result.meta.chart_previous_close);
        let Some(raw_price) = raw_price else {
            debug!(symbol, "chart meta carries no usable price");
            return Ok(None);
        };
        let Some(price) = Decimal::from_f64(raw_price) else {
            return Ok(None);
        };

        Ok(Some(Quote {
            symbol: symbol.to_string(),
            name: result.meta.long_name.or(result.meta.short_name),
            price,
        }))
    }

    async fn history(&self, symbol: &str, range: HistoryRange) -> Result<Vec<Candle>> {
        let url = self.chart_url(symbol, range.as_query())?;
        let Some(response) = self.fetch_chart(url).await? else {
            return Ok(Vec::new());
        };

        let Some(result) = response.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) else {
            return Ok(Vec::new());
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .and_then(|q| q.close)
            .unwrap_or_default();

        let candles = timestamps
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let close = Decimal::from_f64(close?)?;
                let timestamp = Utc.timestamp_opt(ts, 0).single()?;
                Some(Candle { timestamp, close })
            })
            .collect();
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chart_body(price: f64) -> serde_json::Value {
        serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": price,
                        "chartPreviousClose": price - 0.5,
                        "shortName": "Saudi Arabian Oil Co"
                    },
                    "timestamp": [1755500400, 1755586800],
                    "indicators": {"quote": [{"close": [price - 0.5, price]}]}
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_quote_parses_regular_market_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/2222.SR"))
            .and(query_param("range", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(27.15)))
            .mount(&server)
            .await;

        let feed = YahooFeed::new(&server.uri()).unwrap();
        let quote = feed.quote("2222.SR").await.unwrap().expect("quote");
        assert_eq!(quote.price, dec!(27.15));
        assert_eq!(quote.name.as_deref(), Some("Saudi Arabian Oil Co"));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE.SR"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let feed = YahooFeed::new(&server.uri()).unwrap();
        assert!(feed.quote("NOPE.SR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_skips_null_closes() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {"regularMarketPrice": 27.15},
                    "timestamp": [1755500400, 1755586800, 1755673200],
                    "indicators": {"quote": [{"close": [27.0, null, 27.15]}]}
                }],
                "error": null
            }
        });
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/2222.SR"))
            .and(query_param("range", "3mo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let feed = YahooFeed::new(&server.uri()).unwrap();
        let candles = feed
            .history("2222.SR", HistoryRange::ThreeMonths)
            .await
            .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, dec!(27.15));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/2222.SR"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/2222.SR"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(27.15)))
            .mount(&server)
            .await;

        let feed = YahooFeed::new(&server.uri()).unwrap();
        let quote = feed.quote("2222.SR").await.unwrap().expect("quote");
        assert_eq!(quote.price, dec!(27.15));
    }
}
