//! Unit Conversion Utilities
//!
//! Both networks denominate in integer base units with 1e9 base units
//! per whole coin.

/// Base units per whole coin
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000;

/// Convert whole coins to base units with rounding
pub fn coins_to_base(coins: f64) -> u64 {
    (coins * BASE_UNITS_PER_COIN as f64).round() as u64
}

/// Convert base units to whole coins
pub fn base_to_coins(base: u64) -> f64 {
    base as f64 / BASE_UNITS_PER_COIN as f64
}

/// Format base units as a human-readable string
/// e.g., 1500000000 -> "1500000000 base units (1.500000000 coins)"
pub fn format_base(base: u64) -> String {
    format!("{} base units ({:.9} coins)", base, base_to_coins(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coins_to_base() {
        assert_eq!(coins_to_base(1.0), 1_000_000_000);
        assert_eq!(coins_to_base(0.5), 500_000_000);
        assert_eq!(coins_to_base(0.0), 0);
    }

    #[test]
    fn test_base_to_coins() {
        assert_eq!(base_to_coins(1_000_000_000), 1.0);
        assert_eq!(base_to_coins(250_000_000), 0.25);
    }

    #[test]
    fn test_format_base() {
        let formatted = format_base(1_500_000_000);
        assert!(formatted.contains("1500000000"));
        assert!(formatted.contains("1.500000000"));
    }
}
