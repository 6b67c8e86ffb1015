use serde::{Deserialize, Serialize};

/// Point-in-time snapshot returned by the market-data provider.
///
/// Upstream fields are frequently missing for thin listings, so everything
/// beyond the symbol is optional; the fetcher rejects a snapshot only when
/// neither price nor market cap is usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub display_name: Option<String>,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub market_cap: Option<f64>,
    pub currency: Option<String>,
    pub volume: Option<u64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

impl QuoteSnapshot {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            display_name: None,
            price: None,
            previous_close: None,
            market_cap: None,
            currency: None,
            volume: None,
            high_52w: None,
            low_52w: None,
        }
    }

    /// Native currency code, defaulting to USD when the provider omits it
    pub fn currency_or_usd(&self) -> &str {
        self.currency.as_deref().unwrap_or("USD")
    }

    /// A snapshot is usable when it carries a price or a market cap
    pub fn is_usable(&self) -> bool {
        self.price.is_some() || self.market_cap.is_some()
    }
}

/// Normalized single-ticker detail payload served for charting.
///
/// All monetary fields are in `currency`; `history` is a finite snapshot of
/// closing prices, never a live stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "previousClose")]
    pub previous_close: f64,
    pub change: f64,
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
    pub volume: u64,
    #[serde(rename = "high52w")]
    pub high_52w: Option<f64>,
    #[serde(rename = "low52w")]
    pub low_52w: Option<f64>,
    pub currency: String,
    pub history: Vec<f64>,
}
