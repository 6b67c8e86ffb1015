use crate::constants::BACKFILL_SERIES_LEN;
use crate::models::OhlcBar;

/// Extract the closing-price series from an OHLC table.
///
/// Order is preserved; missing and NaN entries are dropped.
pub fn extract_closes(bars: &[OhlcBar]) -> Vec<f64> {
    bars.iter()
        .filter_map(|bar| bar.close)
        .filter(|close| close.is_finite())
        .collect()
}

/// Guarantee chart consumers never receive a null series.
///
/// An empty series with a known current price becomes a flat line of fixed
/// length; with no price either, it stays empty.
pub fn backfill(closes: Vec<f64>, current_price: Option<f64>) -> Vec<f64> {
    if !closes.is_empty() {
        return closes;
    }
    match current_price {
        Some(price) => vec![price; BACKFILL_SERIES_LEN],
        None => Vec::new(),
    }
}
