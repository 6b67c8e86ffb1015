pub mod api;

use crate::models::Registries;
use crate::services::{
    CurrencyNormalizer, MarketDataSource, RegionalDatabaseBuilder, StockDetailService,
};
use axum::{extract::FromRef, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<RegionalDatabaseBuilder>,
    pub detail: Arc<StockDetailService>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        normalizer: CurrencyNormalizer,
        registries: Arc<Registries>,
    ) -> Self {
        let builder = Arc::new(RegionalDatabaseBuilder::new(
            source.clone(),
            normalizer.clone(),
            registries.clone(),
        ));
        let detail = Arc::new(StockDetailService::new(source, normalizer, registries));
        Self { builder, detail }
    }
}

impl FromRef<AppState> for Arc<RegionalDatabaseBuilder> {
    fn from_ref(app_state: &AppState) -> Arc<RegionalDatabaseBuilder> {
        app_state.builder.clone()
    }
}

impl FromRef<AppState> for Arc<StockDetailService> {
    fn from_ref(app_state: &AppState) -> Arc<StockDetailService> {
        app_state.detail.clone()
    }
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting finviser server");

    // The dashboard is served from a separate origin in development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  GET /api/database/{{region}}");
    tracing::info!("  GET /api/stock/{{ticker}}?period=1M");
    tracing::info!("  GET /health");

    let app = Router::new()
        .route("/api/database/{region}", get(api::get_database_handler))
        .route("/api/stock/{ticker}", get(api::get_stock_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
