//! Shared constants for classification, charting and upstream access.

/// Market-cap cutoff for the Large Cap tier, in USD (closed lower bound)
pub const LARGE_CAP_USD: f64 = 10e9;

/// Market-cap cutoff for the Mid Cap tier, in USD (closed lower bound)
pub const MID_CAP_USD: f64 = 2e9;

pub const USD_PER_BILLION: f64 = 1_000_000_000.0;
pub const USD_PER_MILLION: f64 = 1_000_000.0;

/// Length of the flat series backfilled when a chart would otherwise be empty
pub const BACKFILL_SERIES_LEN: usize = 30;

/// Upper bound on concurrent per-ticker fetches during a database build
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// Per-ticker budget for quote + history during a database build, in seconds
pub const TICKER_FETCH_TIMEOUT_SECS: u64 = 15;

/// Request timeout applied to every market-data HTTP call, in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Timeout for live FX-rate lookups, in seconds (kept short - a stale
/// fallback rate beats a stalled page)
pub const FX_TIMEOUT_SECS: u64 = 5;

/// Fallback INR->USD rate used when the live FX lookup fails
pub const FX_FALLBACK_RATE: f64 = 0.012;

/// Market-data requests allowed per minute against the upstream provider
pub const PROVIDER_RATE_LIMIT_PER_MINUTE: u32 = 60;
