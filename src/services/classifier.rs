use crate::constants::{LARGE_CAP_USD, MID_CAP_USD};
use crate::models::Tier;

/// Map a USD market cap to its tier.
///
/// Total over all real inputs: thresholds are closed lower bounds, so a cap
/// exactly at a cutoff belongs to the higher tier, and anything below the
/// Mid cutoff (including non-positive values) is Small.
pub fn classify(market_cap_usd: f64) -> Tier {
    if market_cap_usd >= LARGE_CAP_USD {
        Tier::Large
    } else if market_cap_usd >= MID_CAP_USD {
        Tier::Mid
    } else {
        Tier::Small
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_values() {
        assert_eq!(classify(10e9), Tier::Large);
        assert_eq!(classify(9.99e9), Tier::Mid);
        assert_eq!(classify(2e9), Tier::Mid);
        assert_eq!(classify(1.99e9), Tier::Small);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(classify(0.0), Tier::Small);
        assert_eq!(classify(-1.0), Tier::Small);
        assert_eq!(classify(f64::MAX), Tier::Large);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let samples = [
            -1e9, 0.0, 1.0, 1.99e9, 2e9, 5e9, 9.99e9, 10e9, 1e12, 3e12,
        ];
        let mut previous = classify(samples[0]);
        for &cap in &samples[1..] {
            let tier = classify(cap);
            assert!(tier >= previous, "classify not monotonic at {}", cap);
            previous = tier;
        }
    }
}
