use crate::error::{Error, Result};
use crate::models::{PeriodToken, Registries, StockQuote};
use crate::services::fx::CurrencyNormalizer;
use crate::services::provider::{fetch_any_listing, MarketDataSource};
use crate::services::resampler;
use std::sync::Arc;
use tracing::{debug, info};

const TARGET_CURRENCY: &str = "USD";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds a normalized single-ticker detail payload for charting.
///
/// Works for arbitrary tickers, not just registry members; registry entries
/// contribute their configured alternate listings for fallback.
pub struct StockDetailService {
    source: Arc<dyn MarketDataSource>,
    normalizer: CurrencyNormalizer,
    registries: Arc<Registries>,
}

impl StockDetailService {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        normalizer: CurrencyNormalizer,
        registries: Arc<Registries>,
    ) -> Self {
        Self {
            source,
            normalizer,
            registries,
        }
    }

    pub async fn detail(&self, ticker: &str, period: PeriodToken) -> Result<StockQuote> {
        let (range, interval) = period.resolve();
        let listings = self.registries.listings_for(ticker);

        debug!(ticker, period = %period, range, interval, ?listings, "Building stock detail");

        let data = fetch_any_listing(self.source.as_ref(), &listings, range, interval).await?;
        let closes = resampler::extract_closes(&data.bars);
        let quote = data.quote;

        // Recover price fields from history when the quote omits them
        let price = quote
            .as_ref()
            .and_then(|q| q.price)
            .or_else(|| closes.last().copied());
        let Some(price) = price else {
            return Err(Error::NotFound(ticker.to_string()));
        };

        let previous_close = quote
            .as_ref()
            .and_then(|q| q.previous_close)
            .or_else(|| {
                if closes.len() > 1 {
                    Some(closes[closes.len() - 2])
                } else {
                    None
                }
            })
            .unwrap_or(price);

        let native_currency = quote
            .as_ref()
            .map(|q| q.currency_or_usd().to_string())
            .unwrap_or_else(|| TARGET_CURRENCY.to_string());

        // One rate for every monetary field keeps the payload internally
        // consistent
        let rate = self
            .normalizer
            .rate(&native_currency, TARGET_CURRENCY)
            .await;

        let price = price * rate;
        let previous_close = previous_close * rate;
        let change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            (change / previous_close) * 100.0
        } else {
            0.0
        };

        let market_cap = round2(quote.as_ref().and_then(|q| q.market_cap).unwrap_or(0.0) * rate);
        let volume = quote.as_ref().and_then(|q| q.volume).unwrap_or(0);
        let high_52w = quote.as_ref().and_then(|q| q.high_52w).map(|h| round2(h * rate));
        let low_52w = quote.as_ref().and_then(|q| q.low_52w).map(|l| round2(l * rate));

        let name = quote
            .as_ref()
            .and_then(|q| q.display_name.clone())
            .unwrap_or_else(|| ticker.to_uppercase());

        let history: Vec<f64> = closes.iter().map(|&c| round2(c * rate)).collect();
        let history = resampler::backfill(history, Some(round2(price)));

        info!(ticker = %data.listing, currency = %native_currency, points = history.len(), "Stock detail built");

        Ok(StockQuote {
            ticker: data.listing,
            name,
            price: round2(price),
            previous_close: round2(previous_close),
            change: round2(change),
            change_percent: round2(change_percent),
            market_cap,
            volume,
            high_52w,
            low_52w,
            currency: TARGET_CURRENCY.to_string(),
            history,
        })
    }
}
