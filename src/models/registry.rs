use crate::models::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One company in a regional registry: canonical display name plus the
/// provider listings it trades under, in fallback order.
///
/// Most companies have exactly one listing. Dual-listed companies carry an
/// ordered list and the fetcher tries each in turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub listings: Vec<String>,
}

impl RegistryEntry {
    pub fn single(name: &str, ticker: &str) -> Self {
        Self {
            name: name.to_string(),
            listings: vec![ticker.to_string()],
        }
    }

    pub fn multi(name: &str, listings: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            listings: listings.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Primary listing shown in company tables
    pub fn primary(&self) -> &str {
        self.listings.first().map(|s| s.as_str()).unwrap_or("")
    }
}

/// Ordered per-region company registries, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registries {
    #[serde(flatten)]
    pub regions: HashMap<Region, Vec<RegistryEntry>>,
}

impl Registries {
    /// Load registries from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| crate::error::Error::Config(format!("Failed to read registry: {}", e)))?;
        let regions: HashMap<Region, Vec<RegistryEntry>> = serde_json::from_str(&content)?;
        Ok(Self { regions })
    }

    /// Load from `registries.json` in the working directory, falling back to
    /// the built-in configuration
    pub fn load_default() -> Self {
        match Self::from_file("registries.json") {
            Ok(registries) => registries,
            Err(_) => Self::builtin(),
        }
    }

    /// Entries for one region (empty slice if the region has no registry)
    pub fn entries(&self, region: Region) -> &[RegistryEntry] {
        self.regions.get(&region).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Look up the configured listings for a symbol across all regions.
    ///
    /// Matches the canonical symbol (e.g. "TCS") against each entry's
    /// listings with exchange suffixes stripped, so a detail request for a
    /// dual-listed company picks up its full fallback chain. Unknown symbols
    /// get themselves as the only listing.
    pub fn listings_for(&self, symbol: &str) -> Vec<String> {
        let wanted = symbol.to_uppercase();
        for entries in self.regions.values() {
            for entry in entries {
                let matches = entry.listings.iter().any(|l| {
                    let bare = l.split('.').next().unwrap_or(l);
                    l.eq_ignore_ascii_case(&wanted) || bare.eq_ignore_ascii_case(&wanted)
                });
                if matches {
                    return entry.listings.clone();
                }
            }
        }
        vec![wanted]
    }

    /// Built-in registry content
    pub fn builtin() -> Self {
        let mut regions = HashMap::new();

        regions.insert(
            Region::Usa,
            vec![
                RegistryEntry::single("Aeva Technologies Inc", "AEVA"),
                RegistryEntry::single("The Oncology Institute", "TOI"),
                RegistryEntry::single("Mattel Inc", "MAT"),
                RegistryEntry::single("Avis Budget Group Inc", "CAR"),
                RegistryEntry::single("Apple Inc.", "AAPL"),
                RegistryEntry::single("Microsoft Corp", "MSFT"),
                RegistryEntry::single("Amazon.com Inc", "AMZN"),
                RegistryEntry::single("Alphabet Inc. (Class A)", "GOOGL"),
                RegistryEntry::single("Tesla Inc", "TSLA"),
                RegistryEntry::single("NVIDIA Corp", "NVDA"),
                RegistryEntry::single("JPMorgan Chase & Co.", "JPM"),
            ],
        );

        regions.insert(
            Region::India,
            vec![
                RegistryEntry::single("INFOSYS Ltd", "INFY.NS"),
                RegistryEntry::single("Gujarat State Fertilizers & Chemicals Ltd", "GSFC.NS"),
                RegistryEntry::single("Dixon Technologies", "DIXON.NS"),
                RegistryEntry::single("Mankind Pharma Ltd", "MANKIND.NS"),
                RegistryEntry::single("Arvind Ltd", "ARVIND.NS"),
                // Dual listed: NSE first, BSE as fallback
                RegistryEntry::multi("TCS Ltd", &["TCS.NS", "TCS.BO"]),
            ],
        );

        regions.insert(
            Region::Europe,
            vec![
                RegistryEntry::single("ASML Holding NV", "ASML.AS"),
                RegistryEntry::single("SAP SE", "SAP.DE"),
                RegistryEntry::single("LVMH Moet Hennessy", "MC.PA"),
                RegistryEntry::single("Nestle SA", "NESN.SW"),
                RegistryEntry::single("Siemens AG", "SIE.DE"),
                RegistryEntry::single("Airbus SE", "AIR.PA"),
                RegistryEntry::single("TotalEnergies SE", "TTE.PA"),
            ],
        );

        Self { regions }
    }
}
