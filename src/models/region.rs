use serde::{Deserialize, Serialize};

/// Market region selecting which ticker registry applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// United States listings (USD)
    Usa,
    /// Indian listings on NSE/BSE (INR)
    India,
    /// European listings (EUR/CHF)
    Europe,
}

impl Default for Region {
    fn default() -> Self {
        Region::Usa
    }
}

impl Region {
    /// Parse from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "USA" | "US" | "NA" => Ok(Region::Usa),
            "INDIA" | "IN" => Ok(Region::India),
            "EUROPE" | "EU" => Ok(Region::Europe),
            _ => Err(format!(
                "Invalid region: '{}'. Valid values: usa, india, europe",
                s
            )),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Usa => "USA",
            Region::India => "INDIA",
            Region::Europe => "EUROPE",
        }
    }

    /// All supported regions
    pub fn all() -> Vec<Region> {
        vec![Region::Usa, Region::India, Region::Europe]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_str() {
        assert_eq!(Region::from_str("usa").unwrap(), Region::Usa);
        assert_eq!(Region::from_str("USA").unwrap(), Region::Usa);
        // Legacy dashboard identifier for North America
        assert_eq!(Region::from_str("NA").unwrap(), Region::Usa);
        assert_eq!(Region::from_str("india").unwrap(), Region::India);
        assert_eq!(Region::from_str("EU").unwrap(), Region::Europe);
        assert!(Region::from_str("mars").is_err());
    }

    #[test]
    fn test_region_serialize() {
        let json = serde_json::to_string(&Region::India).unwrap();
        assert_eq!(json, r#""INDIA""#);
    }
}
