use crate::constants::{FX_FALLBACK_RATE, FX_TIMEOUT_SECS};
use crate::error::Result;
use async_trait::async_trait;
use isahc::{prelude::*, HttpClient};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

const FX_BASE_URL: &str = "https://api.exchangerate.host/latest";

/// Source of FX conversion rates.
///
/// Infallible by contract: a source that cannot answer returns its
/// configured fallback, never an error. Which strategy is active is a
/// deployment-time choice.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Scalar multiplying base-currency amounts into the target currency
    async fn rate(&self, base: &str, target: &str) -> f64;
}

/// Static per-currency rate table with identity fallback.
///
/// Unknown currency codes convert at 1.0. That is deliberate: an unmapped
/// currency renders at face value instead of failing the whole page.
pub struct StaticTable {
    rates: HashMap<String, f64>,
}

impl StaticTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Built-in USD rate table
    pub fn default_table() -> Self {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.00);
        rates.insert("EUR".to_string(), 1.07);
        rates.insert("CHF".to_string(), 1.10);
        rates.insert("INR".to_string(), 1.0 / 83.0);
        rates.insert("GBp".to_string(), 0.0127);
        Self { rates }
    }
}

#[async_trait]
impl RateSource for StaticTable {
    async fn rate(&self, base: &str, target: &str) -> f64 {
        if base == target {
            return 1.0;
        }
        // Identity fallback for unknown codes
        self.rates.get(base).copied().unwrap_or(1.0)
    }
}

/// Single pinned constant rate for deployments tied to one source currency
pub struct FixedRate {
    rate: f64,
}

impl FixedRate {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateSource for FixedRate {
    async fn rate(&self, base: &str, target: &str) -> f64 {
        if base == target {
            1.0
        } else {
            self.rate
        }
    }
}

/// Live lookup against an external FX service, with a static fallback
/// constant used whenever the call errors or times out.
pub struct LiveRate {
    client: HttpClient,
    base_url: String,
    fallback: f64,
}

impl LiveRate {
    pub fn new(fallback: f64) -> Result<Self> {
        Self::with_base_url(FX_BASE_URL, fallback)
    }

    /// Build against a specific FX endpoint
    pub fn with_base_url(base_url: &str, fallback: f64) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(FX_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            fallback,
        })
    }

    fn parse_rate(data: &Value, target: &str) -> Option<f64> {
        data.get("rates").and_then(|r| r.get(target)).and_then(|v| v.as_f64())
    }
}

#[async_trait]
impl RateSource for LiveRate {
    async fn rate(&self, base: &str, target: &str) -> f64 {
        if base == target {
            return 1.0;
        }

        let url = format!("{}?base={}&symbols={}", self.base_url, base, target);
        let looked_up = match self.client.get_async(url.as_str()).await {
            Ok(mut resp) if resp.status().is_success() => match resp.text().await {
                Ok(text) => serde_json::from_str::<Value>(&text)
                    .ok()
                    .and_then(|data| Self::parse_rate(&data, target)),
                Err(e) => {
                    warn!(base, target, error = %e, "FX response body error");
                    None
                }
            },
            Ok(resp) => {
                warn!(base, target, status = %resp.status(), "FX lookup failed");
                None
            }
            Err(e) => {
                warn!(base, target, error = %e, "FX lookup failed");
                None
            }
        };

        match looked_up {
            Some(rate) => {
                debug!(base, target, rate, "Live FX rate");
                rate
            }
            None => self.fallback,
        }
    }
}

/// Converts monetary amounts between currencies through the configured
/// rate-source strategy.
#[derive(Clone)]
pub struct CurrencyNormalizer {
    source: Arc<dyn RateSource>,
}

impl CurrencyNormalizer {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }

    /// Default strategy: static table with identity fallback
    pub fn with_static_table() -> Self {
        Self::new(Arc::new(StaticTable::default_table()))
    }

    pub fn with_fixed_rate(rate: f64) -> Self {
        Self::new(Arc::new(FixedRate::new(rate)))
    }

    pub fn with_live_rates(fallback: f64) -> Result<Self> {
        Ok(Self::new(Arc::new(LiveRate::new(fallback)?)))
    }

    /// Build the strategy from `FX_STRATEGY` / `FX_FIXED_RATE` /
    /// `FX_FALLBACK_RATE` environment variables. Unset or unknown values
    /// select the static table.
    pub fn from_env() -> Self {
        let strategy = std::env::var("FX_STRATEGY").unwrap_or_default();
        match strategy.to_lowercase().as_str() {
            "fixed" => {
                let rate = std::env::var("FX_FIXED_RATE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(FX_FALLBACK_RATE);
                Self::with_fixed_rate(rate)
            }
            "live" => {
                let fallback = std::env::var("FX_FALLBACK_RATE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(FX_FALLBACK_RATE);
                match Self::with_live_rates(fallback) {
                    Ok(normalizer) => normalizer,
                    Err(e) => {
                        warn!(error = %e, "Failed to build live FX client, using static table");
                        Self::with_static_table()
                    }
                }
            }
            _ => Self::with_static_table(),
        }
    }

    /// Conversion rate from `base` into `target` (1.0 when equal)
    pub async fn rate(&self, base: &str, target: &str) -> f64 {
        if base == target {
            return 1.0;
        }
        self.source.rate(base, target).await
    }

    /// Convert an amount from `native` into `target`
    pub async fn convert(&self, amount: f64, native: &str, target: &str) -> f64 {
        if native == target {
            return amount;
        }
        amount * self.source.rate(native, target).await
    }

    /// Convert an amount into USD
    pub async fn to_usd(&self, amount: f64, native: &str) -> f64 {
        self.convert(amount, native, "USD").await
    }
}
