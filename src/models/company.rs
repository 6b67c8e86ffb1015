use crate::models::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Market-capitalization tier, assigned by USD thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Small Cap")]
    Small,
    #[serde(rename = "Mid Cap")]
    Mid,
    #[serde(rename = "Large Cap")]
    Large,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Large => "Large Cap",
            Tier::Mid => "Mid Cap",
            Tier::Small => "Small Cap",
        }
    }

    /// Tiers in dashboard display order, largest first
    pub fn all() -> [Tier; 3] {
        [Tier::Large, Tier::Mid, Tier::Small]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified company, built fresh per database request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub ticker: String,
    pub region: Region,
    pub native_currency: String,
    pub market_cap_usd: f64,
    pub tier: Tier,
}

/// Why a registry entry produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    /// Provider responded but had no usable market-cap data
    NoData,
    /// Transport failure, timeout, or provider exception
    Error,
}

/// Sentinel entry substituted when a ticker's data cannot be obtained,
/// preserving batch completeness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderRecord {
    pub name: String,
    pub ticker: String,
    pub kind: PlaceholderKind,
}

/// Per-ticker result of a database build. Failures stay structured here;
/// display sentinels are chosen at the presentation boundary.
#[derive(Debug, Clone)]
pub enum TickerOutcome {
    Listed(CompanyRecord),
    Placeholder(PlaceholderRecord),
}

/// Tier-bucketed company collection for one region
#[derive(Debug, Clone, Serialize)]
pub struct RegionDatabase {
    pub region: Region,
    pub tiers: BTreeMap<Tier, Vec<CompanyRecord>>,
    pub placeholders: Vec<PlaceholderRecord>,
}

impl RegionDatabase {
    pub fn new(region: Region) -> Self {
        let mut tiers = BTreeMap::new();
        for tier in Tier::all() {
            tiers.insert(tier, Vec::new());
        }
        Self {
            region,
            tiers,
            placeholders: Vec::new(),
        }
    }

    /// Merge one per-ticker outcome. Called from the single coordinating
    /// routine; registration order within a bucket is preserved.
    pub fn push(&mut self, outcome: TickerOutcome) {
        match outcome {
            TickerOutcome::Listed(record) => {
                self.tiers.entry(record.tier).or_default().push(record);
            }
            TickerOutcome::Placeholder(placeholder) => {
                self.placeholders.push(placeholder);
            }
        }
    }

    /// Total entries including placeholders
    pub fn len(&self) -> usize {
        self.tiers.values().map(|v| v.len()).sum::<usize>() + self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
