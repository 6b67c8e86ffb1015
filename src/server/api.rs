use crate::constants::{USD_PER_BILLION, USD_PER_MILLION};
use crate::error::Error;
use crate::models::{PeriodToken, PlaceholderKind, Region, RegionDatabase, Tier};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};

/// One row of a tier bucket as the dashboard renders it
#[derive(Debug, Serialize)]
pub struct CompanyEntry {
    pub name: String,
    pub ticker: String,
    pub market_cap: String,
}

/// Format a USD market cap for display
fn format_market_cap(usd: f64) -> String {
    if usd >= USD_PER_BILLION {
        format!("${:.1}B", usd / USD_PER_BILLION)
    } else {
        format!("${:.1}M", usd / USD_PER_MILLION)
    }
}

/// Flatten a RegionDatabase into the tier->rows map the dashboard expects.
///
/// This is the presentation boundary: structured placeholder outcomes become
/// the "Data N/A" / "Error" sentinel strings here and nowhere else.
fn database_payload(db: &RegionDatabase) -> BTreeMap<&'static str, Vec<CompanyEntry>> {
    let mut payload = BTreeMap::new();

    for tier in Tier::all() {
        let rows = db
            .tiers
            .get(&tier)
            .map(|records| {
                records
                    .iter()
                    .map(|record| CompanyEntry {
                        name: record.name.clone(),
                        ticker: record.ticker.clone(),
                        market_cap: format_market_cap(record.market_cap_usd),
                    })
                    .collect()
            })
            .unwrap_or_default();
        payload.insert(tier.as_str(), rows);
    }

    let placeholders = db
        .placeholders
        .iter()
        .map(|placeholder| CompanyEntry {
            name: placeholder.name.clone(),
            ticker: placeholder.ticker.clone(),
            market_cap: match placeholder.kind {
                PlaceholderKind::NoData => "Data N/A".to_string(),
                PlaceholderKind::Error => "Error".to_string(),
            },
        })
        .collect();
    payload.insert("N/A", placeholders);

    payload
}

/// GET /api/database/{region} - tier-bucketed company listing
#[instrument(skip(app_state))]
pub async fn get_database_handler(
    State(app_state): State<AppState>,
    Path(region): Path<String>,
) -> Response {
    let region = match Region::from_str(&region) {
        Ok(region) => region,
        Err(message) => {
            warn!(message, "Rejected database request");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response();
        }
    };

    let db = app_state.builder.build(region).await;
    info!(region = %region, entries = db.len(), "Serving company database");

    Json(json!({ "success": true, "data": database_payload(&db) })).into_response()
}

/// Query parameters for /api/stock/{ticker}
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub period: Option<String>,
}

/// GET /api/stock/{ticker}?period=1M - normalized detail payload
#[instrument(skip(app_state))]
pub async fn get_stock_handler(
    State(app_state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<StockQuery>,
) -> Response {
    let period = PeriodToken::parse(params.period.as_deref().unwrap_or("1M"));

    match app_state.detail.detail(&ticker, period).await {
        Ok(quote) => Json(json!({ "success": true, "data": quote })).into_response(),
        Err(Error::NotFound(_)) => {
            warn!(ticker, "Stock data not found");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": "Stock data not found." })),
            )
                .into_response()
        }
        Err(e) => {
            error!(ticker, error = %e, "Stock detail failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "success": false, "message": "Upstream market-data error." })),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyRecord, PlaceholderRecord, TickerOutcome};

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(2.83e12), "$2830.0B");
        assert_eq!(format_market_cap(10.0e9), "$10.0B");
        assert_eq!(format_market_cap(456.7e6), "$456.7M");
        assert_eq!(format_market_cap(0.0), "$0.0M");
    }

    #[test]
    fn test_database_payload_buckets_and_sentinels() {
        let mut db = RegionDatabase::new(Region::Usa);
        db.push(TickerOutcome::Listed(CompanyRecord {
            name: "Apple Inc.".to_string(),
            ticker: "AAPL".to_string(),
            region: Region::Usa,
            native_currency: "USD".to_string(),
            market_cap_usd: 2.8e12,
            tier: Tier::Large,
        }));
        db.push(TickerOutcome::Placeholder(PlaceholderRecord {
            name: "Aeva Technologies Inc".to_string(),
            ticker: "AEVA".to_string(),
            kind: PlaceholderKind::NoData,
        }));
        db.push(TickerOutcome::Placeholder(PlaceholderRecord {
            name: "The Oncology Institute".to_string(),
            ticker: "TOI".to_string(),
            kind: PlaceholderKind::Error,
        }));

        let payload = database_payload(&db);

        assert_eq!(payload["Large Cap"].len(), 1);
        assert_eq!(payload["Large Cap"][0].market_cap, "$2800.0B");
        assert!(payload["Mid Cap"].is_empty());
        assert!(payload["Small Cap"].is_empty());
        assert_eq!(payload["N/A"][0].market_cap, "Data N/A");
        assert_eq!(payload["N/A"][1].market_cap, "Error");
    }
}
