use crate::error::{Error, Result};
use crate::models::{OhlcBar, QuoteSnapshot};
use async_trait::async_trait;
use tracing::warn;

/// Upstream market-data source.
///
/// Implemented by the Yahoo client in production and by scripted mocks in
/// tests; the builder and detail service only see this trait.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Point-in-time quote for one listing. Fails with `DataUnavailable`
    /// when the provider returns no usable price/cap fields.
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot>;

    /// OHLC table for the requested (range, interval) window. May be empty.
    async fn fetch_history(&self, symbol: &str, range: &str, interval: &str)
        -> Result<Vec<OhlcBar>>;
}

/// Quote + history obtained from one concrete listing of a symbol
#[derive(Debug, Clone)]
pub struct ListingData {
    /// The listing that answered
    pub listing: String,
    pub quote: Option<QuoteSnapshot>,
    pub bars: Vec<OhlcBar>,
}

/// Try each configured listing in registration order and return data from
/// the first one that yields a usable quote or a non-empty history.
///
/// This is the generic form of dual-listing fallback: nothing here knows
/// which company it is serving, only the ordered listing set. All listings
/// exhausted maps to `NotFound`.
pub async fn fetch_any_listing(
    source: &dyn MarketDataSource,
    listings: &[String],
    range: &str,
    interval: &str,
) -> Result<ListingData> {
    for listing in listings {
        let quote = match source.fetch_quote(listing).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(ticker = %listing, error = %e, "Quote fetch failed, trying history");
                None
            }
        };

        let bars = match source.fetch_history(listing, range, interval).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(ticker = %listing, error = %e, "History fetch failed");
                Vec::new()
            }
        };

        if quote.is_some() || !bars.is_empty() {
            return Ok(ListingData {
                listing: listing.clone(),
                quote,
                bars,
            });
        }

        warn!(ticker = %listing, "Listing yielded no data, falling back to next");
    }

    Err(Error::NotFound(format!(
        "All listings exhausted: {}",
        listings.join(", ")
    )))
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;

    fn usable_quote(symbol: &str, price: f64) -> QuoteSnapshot {
        let mut quote = QuoteSnapshot::empty(symbol);
        quote.price = Some(price);
        quote
    }

    #[tokio::test]
    async fn test_primary_listing_wins() {
        let source = ScriptedSource::new()
            .with_quote("TCS.NS", usable_quote("TCS.NS", 3500.0))
            .with_quote("TCS.BO", usable_quote("TCS.BO", 3499.0));

        let listings = vec!["TCS.NS".to_string(), "TCS.BO".to_string()];
        let data = fetch_any_listing(&source, &listings, "1mo", "1d")
            .await
            .unwrap();
        assert_eq!(data.listing, "TCS.NS");
    }

    #[tokio::test]
    async fn test_fallback_to_secondary() {
        let source = ScriptedSource::new()
            .with_quote_error("TCS.NS", Error::Network("connection reset".to_string()))
            .with_quote("TCS.BO", usable_quote("TCS.BO", 3499.0));

        let listings = vec!["TCS.NS".to_string(), "TCS.BO".to_string()];
        let data = fetch_any_listing(&source, &listings, "1mo", "1d")
            .await
            .unwrap();
        assert_eq!(data.listing, "TCS.BO");
        assert_eq!(data.quote.unwrap().price, Some(3499.0));
    }

    #[tokio::test]
    async fn test_history_only_listing_is_success() {
        let source = ScriptedSource::new()
            .with_quote_error("XYZ", Error::DataUnavailable("XYZ".to_string()))
            .with_history("XYZ", &[10.0, 11.0]);

        let listings = vec!["XYZ".to_string()];
        let data = fetch_any_listing(&source, &listings, "1mo", "1d")
            .await
            .unwrap();
        assert!(data.quote.is_none());
        assert_eq!(data.bars.len(), 2);
    }

    #[tokio::test]
    async fn test_all_listings_exhausted_is_not_found() {
        let source = ScriptedSource::new();
        let listings = vec!["AAA".to_string(), "BBB".to_string()];
        let err = fetch_any_listing(&source, &listings, "1mo", "1d")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
