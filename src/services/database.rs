use crate::constants::{MAX_CONCURRENT_FETCHES, TICKER_FETCH_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::models::{
    CompanyRecord, PlaceholderKind, PlaceholderRecord, QuoteSnapshot, Region, RegionDatabase,
    Registries, RegistryEntry, TickerOutcome,
};
use crate::services::classifier;
use crate::services::fx::CurrencyNormalizer;
use crate::services::provider::MarketDataSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Builds the tier-bucketed company database for one region.
///
/// Drives one quote fetch per registry entry with bounded concurrency and
/// converts every per-ticker failure into a placeholder. One bad ticker
/// never fails the batch.
pub struct RegionalDatabaseBuilder {
    source: Arc<dyn MarketDataSource>,
    normalizer: CurrencyNormalizer,
    registries: Arc<Registries>,
    fetch_timeout: Duration,
}

impl RegionalDatabaseBuilder {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        normalizer: CurrencyNormalizer,
        registries: Arc<Registries>,
    ) -> Self {
        Self {
            source,
            normalizer,
            registries,
            fetch_timeout: Duration::from_secs(TICKER_FETCH_TIMEOUT_SECS),
        }
    }

    /// Override the per-ticker fetch budget
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Build the database for `region`. Infallible by design: failures
    /// surface as placeholder entries, not as an error for the batch.
    pub async fn build(&self, region: Region) -> RegionDatabase {
        let entries = self.registries.entries(region);
        let mut database = RegionDatabase::new(region);

        info!(region = %region, tickers = entries.len(), "Building regional database");

        // Entries run concurrently in bounded groups. The futures live
        // inside this request future, so cancelling the request abandons
        // in-flight fetches; results merge here, in one coordinating routine.
        for chunk in entries.chunks(MAX_CONCURRENT_FETCHES) {
            let outcomes =
                futures::future::join_all(chunk.iter().map(|entry| self.build_entry(region, entry)))
                    .await;
            for outcome in outcomes {
                database.push(outcome);
            }
        }

        info!(
            region = %region,
            listed = database.len() - database.placeholders.len(),
            placeholders = database.placeholders.len(),
            "Regional database built"
        );
        database
    }

    async fn build_entry(&self, region: Region, entry: &RegistryEntry) -> TickerOutcome {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.quote_any_listing(entry)).await;

        let quote = match fetched {
            Ok(Ok(quote)) => quote,
            Ok(Err(e)) => {
                warn!(ticker = %entry.primary(), error = %e, "Quote fetch failed");
                return TickerOutcome::Placeholder(PlaceholderRecord {
                    name: entry.name.clone(),
                    ticker: entry.primary().to_string(),
                    kind: placeholder_kind(&e),
                });
            }
            Err(_) => {
                warn!(ticker = %entry.primary(), "Quote fetch timed out");
                return TickerOutcome::Placeholder(PlaceholderRecord {
                    name: entry.name.clone(),
                    ticker: entry.primary().to_string(),
                    kind: PlaceholderKind::Error,
                });
            }
        };

        let native_currency = quote.currency_or_usd().to_string();
        let market_cap_native = quote.market_cap.filter(|&cap| cap > 0.0);

        match market_cap_native {
            Some(cap) => {
                let market_cap_usd = self.normalizer.to_usd(cap, &native_currency).await;
                let tier = classifier::classify(market_cap_usd);
                TickerOutcome::Listed(CompanyRecord {
                    name: entry.name.clone(),
                    ticker: quote.symbol,
                    region,
                    native_currency,
                    market_cap_usd,
                    tier,
                })
            }
            None => {
                warn!(ticker = %quote.symbol, "Market cap not available");
                TickerOutcome::Placeholder(PlaceholderRecord {
                    name: entry.name.clone(),
                    ticker: quote.symbol,
                    kind: PlaceholderKind::NoData,
                })
            }
        }
    }

    /// Quote via the entry's listings in registration order
    async fn quote_any_listing(&self, entry: &RegistryEntry) -> Result<QuoteSnapshot> {
        let mut last_error = Error::NotFound(entry.name.clone());
        for listing in &entry.listings {
            match self.source.fetch_quote(listing).await {
                Ok(quote) => return Ok(quote),
                Err(e) => {
                    if entry.listings.len() > 1 {
                        warn!(ticker = %listing, error = %e, "Listing failed, trying next");
                    }
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

/// Distinguish "provider had no data" from "something broke". The display
/// sentinel derived from this lives at the presentation boundary.
fn placeholder_kind(error: &Error) -> PlaceholderKind {
    match error {
        Error::DataUnavailable(_) | Error::NotFound(_) => PlaceholderKind::NoData,
        _ => PlaceholderKind::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::services::provider::testing::ScriptedSource;
    use std::collections::HashMap;

    fn quote(symbol: &str, cap: Option<f64>, currency: &str) -> QuoteSnapshot {
        let mut snapshot = QuoteSnapshot::empty(symbol);
        snapshot.price = Some(100.0);
        snapshot.market_cap = cap;
        snapshot.currency = Some(currency.to_string());
        snapshot
    }

    fn registries(entries: Vec<RegistryEntry>) -> Arc<Registries> {
        let mut regions = HashMap::new();
        regions.insert(Region::Usa, entries);
        Arc::new(Registries { regions })
    }

    fn builder(source: ScriptedSource, registries: Arc<Registries>) -> RegionalDatabaseBuilder {
        RegionalDatabaseBuilder::new(
            Arc::new(source),
            CurrencyNormalizer::with_static_table(),
            registries,
        )
    }

    #[tokio::test]
    async fn test_classification_and_conversion() {
        let source = ScriptedSource::new()
            .with_quote("AAPL", quote("AAPL", Some(3.0e12), "USD"))
            .with_quote("SAP.DE", quote("SAP.DE", Some(10e9), "EUR"))
            .with_quote("MAT", quote("MAT", Some(5.0e9), "USD"));

        let registries = registries(vec![
            RegistryEntry::single("Apple Inc.", "AAPL"),
            RegistryEntry::single("SAP SE", "SAP.DE"),
            RegistryEntry::single("Mattel Inc", "MAT"),
        ]);

        let db = builder(source, registries).build(Region::Usa).await;

        assert_eq!(db.tiers[&Tier::Large].len(), 2);
        assert_eq!(db.tiers[&Tier::Mid].len(), 1);
        assert!(db.placeholders.is_empty());

        // 10e9 EUR at the 1.07 table rate crosses the Large cutoff
        let sap = db.tiers[&Tier::Large]
            .iter()
            .find(|r| r.ticker == "SAP.DE")
            .unwrap();
        assert!((sap.market_cap_usd - 10.7e9).abs() < 1e3);
        assert_eq!(sap.native_currency, "EUR");
    }

    #[tokio::test]
    async fn test_one_bad_ticker_never_fails_the_batch() {
        let source = ScriptedSource::new()
            .with_quote("AAPL", quote("AAPL", Some(3.0e12), "USD"))
            .with_quote_error("TOI", Error::Network("connection refused".to_string()))
            .with_quote("MAT", quote("MAT", Some(5.0e9), "USD"));

        let registries = registries(vec![
            RegistryEntry::single("Apple Inc.", "AAPL"),
            RegistryEntry::single("The Oncology Institute", "TOI"),
            RegistryEntry::single("Mattel Inc", "MAT"),
        ]);

        let db = builder(source, registries).build(Region::Usa).await;

        assert_eq!(db.len(), 3);
        assert_eq!(db.placeholders.len(), 1);
        assert_eq!(db.placeholders[0].ticker, "TOI");
        assert_eq!(db.placeholders[0].kind, PlaceholderKind::Error);
    }

    #[tokio::test]
    async fn test_hung_ticker_times_out_to_error_placeholder() {
        // A fetch that never comes back within the budget must degrade to a
        // placeholder while the rest of the batch completes normally.
        let source = ScriptedSource::new()
            .with_quote("AAPL", quote("AAPL", Some(3.0e12), "USD"))
            .with_quote("SLOW", quote("SLOW", Some(5.0e9), "USD"))
            .with_quote_delay("SLOW", Duration::from_secs(30))
            .with_quote("MAT", quote("MAT", Some(5.0e9), "USD"));

        let registries = registries(vec![
            RegistryEntry::single("Apple Inc.", "AAPL"),
            RegistryEntry::single("Slowpoke Corp", "SLOW"),
            RegistryEntry::single("Mattel Inc", "MAT"),
        ]);

        let db = builder(source, registries)
            .with_fetch_timeout(Duration::from_millis(50))
            .build(Region::Usa)
            .await;

        assert_eq!(db.len(), 3);
        assert_eq!(db.placeholders.len(), 1);
        assert_eq!(db.placeholders[0].ticker, "SLOW");
        assert_eq!(db.placeholders[0].kind, PlaceholderKind::Error);
    }

    #[tokio::test]
    async fn test_missing_cap_is_no_data_placeholder() {
        let source = ScriptedSource::new()
            // Quote answers but carries no cap, and a zero cap is no better
            .with_quote("AEVA", quote("AEVA", None, "USD"))
            .with_quote("TOI", quote("TOI", Some(0.0), "USD"));

        let registries = registries(vec![
            RegistryEntry::single("Aeva Technologies Inc", "AEVA"),
            RegistryEntry::single("The Oncology Institute", "TOI"),
        ]);

        let db = builder(source, registries).build(Region::Usa).await;

        assert_eq!(db.placeholders.len(), 2);
        assert!(db
            .placeholders
            .iter()
            .all(|p| p.kind == PlaceholderKind::NoData));
    }

    #[tokio::test]
    async fn test_dual_listing_fallback_in_build() {
        let source = ScriptedSource::new()
            .with_quote_error("TCS.NS", Error::Network("timeout".to_string()))
            .with_quote("TCS.BO", quote("TCS.BO", Some(12.0e12), "INR"));

        let mut regions = HashMap::new();
        regions.insert(
            Region::India,
            vec![RegistryEntry::multi("TCS Ltd", &["TCS.NS", "TCS.BO"])],
        );

        let db = builder(source, Arc::new(Registries { regions }))
            .build(Region::India)
            .await;

        assert!(db.placeholders.is_empty());
        // 12e12 INR at 1/83 is ~144.6e9 USD
        let tcs = &db.tiers[&Tier::Large][0];
        assert_eq!(tcs.ticker, "TCS.BO");
        assert!((tcs.market_cap_usd - 12.0e12 / 83.0).abs() < 1e6);
    }

    #[tokio::test]
    async fn test_empty_registry_builds_empty_database() {
        let db = builder(ScriptedSource::new(), registries(Vec::new()))
            .build(Region::Usa)
            .await;
        assert!(db.is_empty());
    }
}
