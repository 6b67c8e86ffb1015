use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical charting window requested by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodToken {
    /// One trading day, 5-minute bars
    #[serde(rename = "1D")]
    OneDay,
    /// Seven days, hourly bars
    #[serde(rename = "1W")]
    OneWeek,
    /// One month, daily bars
    #[serde(rename = "1M")]
    OneMonth,
    /// Three months, daily bars
    #[serde(rename = "3M")]
    ThreeMonths,
    /// One year, weekly bars
    #[serde(rename = "1Y")]
    OneYear,
}

impl Default for PeriodToken {
    fn default() -> Self {
        PeriodToken::OneMonth
    }
}

impl PeriodToken {
    /// Parse a period token. Unrecognized tokens resolve to 1M rather than
    /// erroring, so a stale dashboard never breaks charting.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "1D" => PeriodToken::OneDay,
            "1W" => PeriodToken::OneWeek,
            "1M" => PeriodToken::OneMonth,
            "3M" => PeriodToken::ThreeMonths,
            "1Y" => PeriodToken::OneYear,
            _ => PeriodToken::OneMonth,
        }
    }

    /// Provider (range, sampling-interval) pair for this window
    pub fn resolve(&self) -> (&'static str, &'static str) {
        match self {
            PeriodToken::OneDay => ("1d", "5m"),
            PeriodToken::OneWeek => ("7d", "1h"),
            PeriodToken::OneMonth => ("1mo", "1d"),
            PeriodToken::ThreeMonths => ("3mo", "1d"),
            PeriodToken::OneYear => ("1y", "1wk"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodToken::OneDay => "1D",
            PeriodToken::OneWeek => "1W",
            PeriodToken::OneMonth => "1M",
            PeriodToken::ThreeMonths => "3M",
            PeriodToken::OneYear => "1Y",
        }
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!(PeriodToken::parse("1D"), PeriodToken::OneDay);
        assert_eq!(PeriodToken::parse("1w"), PeriodToken::OneWeek);
        assert_eq!(PeriodToken::parse("1M"), PeriodToken::OneMonth);
        assert_eq!(PeriodToken::parse("3m"), PeriodToken::ThreeMonths);
        assert_eq!(PeriodToken::parse("1Y"), PeriodToken::OneYear);
    }

    #[test]
    fn test_parse_unknown_defaults_to_one_month() {
        assert_eq!(PeriodToken::parse("6M"), PeriodToken::OneMonth);
        assert_eq!(PeriodToken::parse(""), PeriodToken::OneMonth);
        assert_eq!(PeriodToken::parse("ytd"), PeriodToken::OneMonth);
    }

    #[test]
    fn test_resolve_mappings() {
        assert_eq!(PeriodToken::OneDay.resolve(), ("1d", "5m"));
        assert_eq!(PeriodToken::OneWeek.resolve(), ("7d", "1h"));
        assert_eq!(PeriodToken::OneMonth.resolve(), ("1mo", "1d"));
        assert_eq!(PeriodToken::ThreeMonths.resolve(), ("3mo", "1d"));
        assert_eq!(PeriodToken::OneYear.resolve(), ("1y", "1wk"));

        // Every known token maps away from the default except 1M itself
        for token in [
            PeriodToken::OneDay,
            PeriodToken::OneWeek,
            PeriodToken::ThreeMonths,
            PeriodToken::OneYear,
        ] {
            assert_ne!(token.resolve(), PeriodToken::OneMonth.resolve());
        }
    }
}
