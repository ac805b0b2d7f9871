//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::RoundingPolicy;

/// Rounds `value` to `decimals` places following `policy`.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::round_amount;
/// use nomina_engine::config::RoundingPolicy;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("287.925").unwrap();
/// assert_eq!(
///     round_amount(value, 2, RoundingPolicy::HalfAwayFromZero),
///     Decimal::from_str("287.93").unwrap()
/// );
/// assert_eq!(
///     round_amount(value, 2, RoundingPolicy::Down),
///     Decimal::from_str("287.92").unwrap()
/// );
/// ```
pub fn round_amount(value: Decimal, decimals: u32, policy: RoundingPolicy) -> Decimal {
    let strategy = match policy {
        RoundingPolicy::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
        RoundingPolicy::Up => RoundingStrategy::ToPositiveInfinity,
        RoundingPolicy::Down => RoundingStrategy::ToNegativeInfinity,
    };
    value.round_dp_with_strategy(decimals, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_half_away_from_zero_midpoint() {
        assert_eq!(
            round_amount(dec("2.345"), 2, RoundingPolicy::HalfAwayFromZero),
            dec("2.35")
        );
        assert_eq!(
            round_amount(dec("-2.345"), 2, RoundingPolicy::HalfAwayFromZero),
            dec("-2.35")
        );
    }

    #[test]
    fn test_half_away_from_zero_below_midpoint() {
        assert_eq!(
            round_amount(dec("2.344"), 2, RoundingPolicy::HalfAwayFromZero),
            dec("2.34")
        );
    }

    #[test]
    fn test_up_rounds_any_fraction_up() {
        assert_eq!(round_amount(dec("2.341"), 2, RoundingPolicy::Up), dec("2.35"));
        assert_eq!(round_amount(dec("2.340"), 2, RoundingPolicy::Up), dec("2.34"));
    }

    #[test]
    fn test_down_truncates_positive_amounts() {
        assert_eq!(round_amount(dec("2.349"), 2, RoundingPolicy::Down), dec("2.34"));
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(
            round_amount(dec("241.50"), 0, RoundingPolicy::HalfAwayFromZero),
            dec("242")
        );
    }
}
