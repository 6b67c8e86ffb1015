pub mod database;
pub mod detail;
pub mod serve;

use crate::models::Registries;
use crate::server::AppState;
use crate::services::{CurrencyNormalizer, YahooClient};
use std::sync::Arc;

/// Wire the shared components: provider client, FX strategy from the
/// environment, registries from disk or the built-in configuration.
pub fn build_app_state() -> crate::error::Result<AppState> {
    let client = Arc::new(YahooClient::new(true)?);
    let normalizer = CurrencyNormalizer::from_env();
    let registries = Arc::new(Registries::load_default());
    Ok(AppState::new(client, normalizer, registries))
}
