use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bar of the provider's OHLC table.
///
/// The chart endpoint returns parallel arrays with nullable entries, so
/// every price field is optional. Only the close column feeds the
/// dashboard; the rest is kept for completeness of the table shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcBar {
    /// Timestamp of the bar
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl OhlcBar {
    pub fn new(time: DateTime<Utc>, close: Option<f64>) -> Self {
        Self {
            time,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}
