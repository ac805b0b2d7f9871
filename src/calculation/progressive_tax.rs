//! Progressive income-tax (ISR) resolution.
//!
//! This module evaluates a bracket table against a taxable base and checks
//! bracket tables for well-formedness before they are used.

use rust_decimal::Decimal;

use crate::config::{RoundingPolicy, TaxBracket};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditWarning;

use super::round_amount;

/// Finds the bracket a taxable base falls into.
///
/// The first bracket with `lower_bound <= base <= upper_bound` wins. A base
/// above every upper bound, or inside a gap between brackets, falls back to
/// the last bracket whose lower bound it reaches. Returns `None` for bases
/// below the whole table.
pub fn find_bracket(taxable_base: Decimal, brackets: &[TaxBracket]) -> Option<&TaxBracket> {
    brackets
        .iter()
        .find(|b| {
            b.lower_bound <= taxable_base && b.upper_bound.is_none_or(|upper| taxable_base <= upper)
        })
        .or_else(|| brackets.iter().rev().find(|b| b.lower_bound <= taxable_base))
}

/// Computes the tax due on `taxable_base`.
///
/// `tax = base_tax + (taxable_base - lower_bound) × marginal_rate`, rounded
/// with the given precision and policy. Bases at or below zero owe nothing.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::compute_tax;
/// use nomina_engine::config::{RoundingPolicy, TaxBracket};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let brackets = vec![TaxBracket {
///     lower_bound: Decimal::ZERO,
///     upper_bound: None,
///     marginal_rate: dec("0.05"),
///     base_tax: Decimal::ZERO,
/// }];
///
/// let tax = compute_tax(dec("5758.50"), &brackets, 2, RoundingPolicy::HalfAwayFromZero);
/// assert_eq!(tax, dec("287.93"));
/// ```
pub fn compute_tax(
    taxable_base: Decimal,
    brackets: &[TaxBracket],
    decimals: u32,
    policy: RoundingPolicy,
) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match find_bracket(taxable_base, brackets) {
        Some(bracket) => {
            let tax =
                bracket.base_tax + (taxable_base - bracket.lower_bound) * bracket.marginal_rate;
            round_amount(tax, decimals, policy)
        }
        None => Decimal::ZERO,
    }
}

/// Returns the marginal rate of the bracket `taxable_base` falls into.
///
/// Zero for bases at or below zero and for bases below the whole table.
pub fn marginal_rate(taxable_base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    find_bracket(taxable_base, brackets).map_or(Decimal::ZERO, |b| b.marginal_rate)
}

/// Checks a bracket table for well-formedness.
///
/// Hard failures: an empty table, negative bounds or base tax, a lower bound
/// above its upper bound, a rate outside `[0, 1]`, brackets out of ascending
/// order, overlapping brackets, or an open-ended bracket that is not last.
///
/// Returns warnings for gaps between consecutive brackets, a table that does
/// not start at zero, and a closed last bracket.
pub fn validate_bracket_table(brackets: &[TaxBracket]) -> EngineResult<Vec<AuditWarning>> {
    let invalid = |message: String| EngineError::InvalidBracketTable { message };

    if brackets.is_empty() {
        return Err(invalid("table has no brackets".to_string()));
    }

    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.lower_bound < Decimal::ZERO {
            return Err(invalid(format!("bracket {} has a negative lower bound", i)));
        }
        if let Some(upper) = bracket.upper_bound {
            if upper < Decimal::ZERO {
                return Err(invalid(format!("bracket {} has a negative upper bound", i)));
            }
            if bracket.lower_bound > upper {
                return Err(invalid(format!(
                    "bracket {} lower bound {} exceeds upper bound {}",
                    i, bracket.lower_bound, upper
                )));
            }
        } else if i + 1 != brackets.len() {
            return Err(invalid(format!(
                "bracket {} is open-ended but is not the last bracket",
                i
            )));
        }
        if bracket.marginal_rate < Decimal::ZERO || bracket.marginal_rate > Decimal::ONE {
            return Err(invalid(format!(
                "bracket {} rate {} is outside [0, 1]",
                i, bracket.marginal_rate
            )));
        }
        if bracket.base_tax < Decimal::ZERO {
            return Err(invalid(format!("bracket {} has a negative base tax", i)));
        }
    }

    let mut warnings = Vec::new();

    if brackets[0].lower_bound > Decimal::ZERO {
        warnings.push(AuditWarning::new(
            "BRACKET_TABLE_NOT_FROM_ZERO",
            format!(
                "first bracket starts at {}; smaller bases owe no tax",
                brackets[0].lower_bound
            ),
            "medium",
        ));
    }

    for (i, pair) in brackets.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if next.lower_bound <= current.lower_bound {
            return Err(invalid(format!(
                "bracket {} does not start above bracket {}",
                i + 1,
                i
            )));
        }
        // open-ended brackets were rejected above unless last
        let Some(upper) = current.upper_bound else {
            continue;
        };
        if upper > next.lower_bound {
            return Err(invalid(format!(
                "bracket {} overlaps bracket {} ({} > {})",
                i,
                i + 1,
                upper,
                next.lower_bound
            )));
        }
        if upper < next.lower_bound {
            warnings.push(AuditWarning::new(
                "BRACKET_GAP",
                format!(
                    "gap between brackets {} and {}: {} to {}",
                    i,
                    i + 1,
                    upper,
                    next.lower_bound
                ),
                "medium",
            ));
        }
    }

    if brackets.last().is_some_and(|b| b.upper_bound.is_some()) {
        warnings.push(AuditWarning::new(
            "LAST_BRACKET_CLOSED",
            "last bracket has an upper bound; larger bases reuse it",
            "low",
        ));
    }

    Ok(warnings)
}
