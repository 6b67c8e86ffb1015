use crate::constants::{HTTP_TIMEOUT_SECS, PROVIDER_RATE_LIMIT_PER_MINUTE};
use crate::error::{Error, Result};
use crate::models::{OhlcBar, QuoteSnapshot};
use crate::services::provider::MarketDataSource;
use async_trait::async_trait;
use chrono::DateTime;
use isahc::{prelude::*, HttpClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration as StdDuration, SystemTime};
use tokio::sync::Mutex as TokioMutex;
use tokio::time::sleep;
use tracing::{debug, warn};

const QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const MAX_RETRIES: u32 = 3;

/// Shared rate limiter for provider requests across all concurrent tasks
#[derive(Debug)]
pub struct SharedRateLimiter {
    /// Timestamps of recent requests (sliding window)
    request_timestamps: TokioMutex<Vec<SystemTime>>,
    /// Maximum requests allowed per minute
    rate_limit_per_minute: u32,
}

impl SharedRateLimiter {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            request_timestamps: TokioMutex::new(Vec::new()),
            rate_limit_per_minute,
        }
    }

    /// Enforce rate limiting using a sliding window. Async-safe; callable
    /// from any number of concurrent tasks.
    pub async fn enforce_rate_limit(&self) {
        let current_time = SystemTime::now();
        let mut timestamps = self.request_timestamps.lock().await;

        timestamps.retain(|&timestamp| {
            current_time
                .duration_since(timestamp)
                .unwrap_or(StdDuration::from_secs(0))
                < StdDuration::from_secs(60)
        });

        if timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest_request) = timestamps.first() {
                let wait_time = StdDuration::from_secs(60)
                    - current_time
                        .duration_since(oldest_request)
                        .unwrap_or(StdDuration::from_secs(0));

                if !wait_time.is_zero() {
                    // Drop lock before sleeping so other tasks can check
                    drop(timestamps);
                    sleep(wait_time + StdDuration::from_millis(100)).await;
                    let mut timestamps = self.request_timestamps.lock().await;
                    timestamps.push(current_time);
                    return;
                }
            }
        }
        timestamps.push(current_time);
    }
}

/// Yahoo Finance client: v7 quote endpoint for snapshots, v8 chart endpoint
/// for OHLC history.
#[derive(Clone)]
pub struct YahooClient {
    client: HttpClient,
    user_agents: Vec<String>,
    random_agent: bool,
    rate_limiter: Arc<SharedRateLimiter>,
}

impl YahooClient {
    pub fn new(random_agent: bool) -> Result<Self> {
        Self::with_rate_limit(random_agent, PROVIDER_RATE_LIMIT_PER_MINUTE)
    }

    pub fn with_rate_limit(random_agent: bool, rate_limit_per_minute: u32) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(Self {
            client,
            user_agents,
            random_agent,
            rate_limiter: Arc::new(SharedRateLimiter::new(rate_limit_per_minute)),
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn make_request(&self, url: &str) -> Result<Value> {
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            self.rate_limiter.enforce_rate_limit().await;

            if attempt > 0 {
                let delay =
                    StdDuration::from_secs_f64(2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>());
                let reason = last_error.as_deref().unwrap_or("unknown error");
                debug!(
                    "Provider retry backoff: attempt {}/{} - reason: {}, waiting {:.1}s",
                    attempt + 1,
                    MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let request = isahc::Request::builder()
                .uri(url)
                .method("GET")
                .header("Accept", "application/json, text/plain, */*")
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("User-Agent", self.get_user_agent())
                .body(())
                .map_err(|e| Error::Network(format!("Request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        match resp.text().await {
                            Ok(text) => match serde_json::from_str::<Value>(&text) {
                                Ok(data) => return Ok(data),
                                Err(e) => {
                                    last_error = Some(format!("JSON parse error: {}", e));
                                    continue;
                                }
                            },
                            Err(e) => {
                                last_error = Some(format!("Response body error: {}", e));
                                continue;
                            }
                        }
                    } else if status == 404 {
                        return Err(Error::NotFound(url.to_string()));
                    } else if status == 429 {
                        last_error = Some("Too Many Requests (429)".to_string());
                        continue;
                    } else if status.is_server_error() {
                        last_error = Some(format!("Server error ({})", status.as_u16()));
                        continue;
                    } else {
                        // Other client errors are request problems, not retryable
                        return Err(Error::Network(format!(
                            "HTTP error ({}) for {}",
                            status.as_u16(),
                            url
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        Err(Error::Network(format!(
            "Max retries exceeded: {}",
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    fn parse_quote(symbol: &str, data: &Value) -> Result<QuoteSnapshot> {
        let results = data
            .get("quoteResponse")
            .and_then(|r| r.get("result"))
            .and_then(|r| r.as_array())
            .ok_or_else(|| Error::Parse(format!("Malformed quote response for {}", symbol)))?;

        let item = results
            .first()
            .ok_or_else(|| Error::NotFound(symbol.to_string()))?;

        let snapshot = QuoteSnapshot {
            symbol: symbol.to_uppercase(),
            display_name: item
                .get("longName")
                .or_else(|| item.get("shortName"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            price: item.get("regularMarketPrice").and_then(|v| v.as_f64()),
            previous_close: item
                .get("regularMarketPreviousClose")
                .and_then(|v| v.as_f64()),
            market_cap: item.get("marketCap").and_then(|v| v.as_f64()),
            currency: item
                .get("currency")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            volume: item.get("regularMarketVolume").and_then(|v| v.as_u64()),
            high_52w: item.get("fiftyTwoWeekHigh").and_then(|v| v.as_f64()),
            low_52w: item.get("fiftyTwoWeekLow").and_then(|v| v.as_f64()),
        };

        if !snapshot.is_usable() {
            return Err(Error::DataUnavailable(symbol.to_string()));
        }

        Ok(snapshot)
    }

    fn parse_chart(symbol: &str, data: &Value) -> Result<Vec<OhlcBar>> {
        let chart = data
            .get("chart")
            .ok_or_else(|| Error::Parse(format!("Malformed chart response for {}", symbol)))?;

        // An explicit provider error for the window means "no table", not a
        // transport failure
        if chart.get("error").map(|e| !e.is_null()).unwrap_or(false) {
            warn!(ticker = %symbol, "Provider returned chart error, treating as empty table");
            return Ok(Vec::new());
        }

        let result = match chart
            .get("result")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
        {
            Some(result) => result,
            None => return Ok(Vec::new()),
        };

        let timestamps = result
            .get("timestamp")
            .and_then(|t| t.as_array())
            .cloned()
            .unwrap_or_default();

        let quote = result
            .get("indicators")
            .and_then(|i| i.get("quote"))
            .and_then(|q| q.as_array())
            .and_then(|q| q.first())
            .cloned()
            .unwrap_or(Value::Null);

        let column = |name: &str| -> Vec<Value> {
            quote
                .get(name)
                .and_then(|c| c.as_array())
                .cloned()
                .unwrap_or_default()
        };

        let opens = column("open");
        let highs = column("high");
        let lows = column("low");
        let closes = column("close");
        let volumes = column("volume");

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(ts) = ts.as_i64() else { continue };
            let Some(time) = DateTime::from_timestamp(ts, 0) else {
                continue;
            };
            bars.push(OhlcBar {
                time,
                open: opens.get(i).and_then(|v| v.as_f64()),
                high: highs.get(i).and_then(|v| v.as_f64()),
                low: lows.get(i).and_then(|v| v.as_f64()),
                close: closes.get(i).and_then(|v| v.as_f64()),
                volume: volumes.get(i).and_then(|v| v.as_u64()),
            });
        }

        debug!(ticker = %symbol, bars = bars.len(), "Parsed chart response");
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        let url = format!("{}?symbols={}", QUOTE_BASE_URL, symbol);
        let data = self.make_request(&url).await?;
        Self::parse_quote(symbol, &data)
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcBar>> {
        let url = format!(
            "{}/{}?range={}&interval={}",
            CHART_BASE_URL, symbol, range, interval
        );
        let data = self.make_request(&url).await?;
        Self::parse_chart(symbol, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_quote_full() {
        let data = json!({
            "quoteResponse": {
                "result": [{
                    "longName": "Apple Inc.",
                    "regularMarketPrice": 175.5,
                    "regularMarketPreviousClose": 173.0,
                    "marketCap": 2.8e12,
                    "currency": "USD",
                    "regularMarketVolume": 52_000_000u64,
                    "fiftyTwoWeekHigh": 199.6,
                    "fiftyTwoWeekLow": 124.2
                }],
                "error": null
            }
        });

        let snapshot = YahooClient::parse_quote("aapl", &data).unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.display_name.as_deref(), Some("Apple Inc."));
        assert_eq!(snapshot.price, Some(175.5));
        assert_eq!(snapshot.market_cap, Some(2.8e12));
        assert_eq!(snapshot.currency_or_usd(), "USD");
    }

    #[test]
    fn test_parse_quote_empty_result_is_not_found() {
        let data = json!({ "quoteResponse": { "result": [], "error": null } });
        let err = YahooClient::parse_quote("ZZZZ", &data).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_parse_quote_no_price_or_cap_is_unavailable() {
        let data = json!({
            "quoteResponse": {
                "result": [{ "currency": "USD", "shortName": "Ghost Corp" }],
                "error": null
            }
        });
        let err = YahooClient::parse_quote("GHST", &data).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[test]
    fn test_parse_chart_with_nulls() {
        let data = json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "open": [10.0, null, 12.0],
                            "high": [10.5, null, 12.5],
                            "low": [9.5, null, 11.5],
                            "close": [10.2, null, 12.2],
                            "volume": [1000, null, 1200]
                        }]
                    }
                }],
                "error": null
            }
        });

        let bars = YahooClient::parse_chart("MAT", &data).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, Some(10.2));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[2].close, Some(12.2));
    }

    #[test]
    fn test_parse_chart_provider_error_is_empty() {
        let data = json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        });
        let bars = YahooClient::parse_chart("ZZZZ", &data).unwrap();
        assert!(bars.is_empty());
    }
}
