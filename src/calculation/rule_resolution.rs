//! Legal rule set selection and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::config::LegalRuleSet;
use crate::error::{EngineError, EngineResult};
use crate::models::AuditWarning;

use super::validate_bracket_table;

/// Selects the rule set that applies to `jurisdiction` on `as_of`.
///
/// Among active rule sets of the jurisdiction whose date range covers
/// `as_of`, the one with the latest `effective_from` wins. There is no
/// fallback: if nothing matches the call fails with
/// [`EngineError::NoApplicableRuleSet`].
///
/// # Example
///
/// ```no_run
/// use nomina_engine::calculation::resolve_rules;
/// use nomina_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/gt").unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// let rules = resolve_rules(loader.rule_sets(), "GT", date).unwrap();
/// assert!(rules.effective_from <= date);
/// ```
pub fn resolve_rules<'a>(
    rule_sets: &'a [LegalRuleSet],
    jurisdiction: &str,
    as_of: NaiveDate,
) -> EngineResult<&'a LegalRuleSet> {
    rule_sets
        .iter()
        .filter(|rs| rs.jurisdiction == jurisdiction && rs.applies_on(as_of))
        .max_by_key(|rs| rs.effective_from)
        .ok_or_else(|| EngineError::NoApplicableRuleSet {
            jurisdiction: jurisdiction.to_string(),
            date: as_of,
        })
}

/// Validates a rule set and returns any non-fatal warnings.
pub fn validate_rule_set(rule_set: &LegalRuleSet) -> EngineResult<Vec<AuditWarning>> {
    let invalid = |message: String| EngineError::InvalidRuleSet {
        jurisdiction: rule_set.jurisdiction.clone(),
        effective_from: rule_set.effective_from,
        message,
    };

    if let Some(to) = rule_set.effective_to {
        if to < rule_set.effective_from {
            return Err(invalid(format!("effective_to {} precedes effective_from", to)));
        }
    }

    let rates = [
        ("social_security.employee_rate", rule_set.social_security.employee_rate),
        ("social_security.employer_rate", rule_set.social_security.employer_rate),
        ("training_fund_rate", rule_set.training_fund_rate),
        ("recreation_fund_rate", rule_set.recreation_fund_rate),
        ("provisions.aguinaldo", rule_set.provisions.aguinaldo),
        ("provisions.bono14", rule_set.provisions.bono14),
        ("provisions.vacation", rule_set.provisions.vacation),
        ("provisions.severance", rule_set.provisions.severance),
    ];
    for (name, rate) in rates {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(invalid(format!("{} {} is outside [0, 1]", name, rate)));
        }
    }

    let amounts = [
        ("social_security.max_contribution_base", rule_set.social_security.max_contribution_base),
        ("statutory_bonus", rule_set.statutory_bonus),
        ("annual_bonus_exemption", rule_set.annual_bonus_exemption),
        ("overtime_multiplier", rule_set.overtime_multiplier),
        ("overtime_night_multiplier", rule_set.overtime_night_multiplier),
    ];
    for (name, amount) in amounts {
        if amount < Decimal::ZERO {
            return Err(invalid(format!("{} must not be negative", name)));
        }
    }

    if rule_set.standard_monthly_hours <= Decimal::ZERO {
        return Err(invalid("standard_monthly_hours must be positive".to_string()));
    }

    validate_bracket_table(&rule_set.tax_brackets)
}

/// Rejects two active rule sets of one jurisdiction starting the same day,
/// which would make selection ambiguous.
pub fn ensure_unambiguous(rule_sets: &[LegalRuleSet]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for rule_set in rule_sets.iter().filter(|rs| rs.active) {
        if !seen.insert((rule_set.jurisdiction.as_str(), rule_set.effective_from)) {
            return Err(EngineError::AmbiguousRuleSet {
                jurisdiction: rule_set.jurisdiction.clone(),
                effective_from: rule_set.effective_from,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::test_support::{date, dec, sample_rule_set};

    fn rule_set_from(from: NaiveDate, to: Option<NaiveDate>) -> LegalRuleSet {
        let mut rs = sample_rule_set();
        rs.effective_from = from;
        rs.effective_to = to;
        rs
    }

    #[test]
    fn test_latest_effective_from_wins() {
        let older = rule_set_from(date(2023, 1, 1), None);
        let mut newer = rule_set_from(date(2025, 1, 1), None);
        newer.statutory_bonus = dec("300.00");
        let sets = vec![older, newer];

        let rules = resolve_rules(&sets, "GT", date(2025, 3, 1)).unwrap();
        assert_eq!(rules.statutory_bonus, dec("300.00"));

        let rules = resolve_rules(&sets, "GT", date(2024, 12, 31)).unwrap();
        assert_eq!(rules.effective_from, date(2023, 1, 1));
    }

    #[test]
    fn test_effective_to_is_inclusive() {
        let sets = vec![rule_set_from(date(2023, 1, 1), Some(date(2023, 12, 31)))];

        assert!(resolve_rules(&sets, "GT", date(2023, 12, 31)).is_ok());
        assert!(resolve_rules(&sets, "GT", date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_inactive_rule_sets_are_skipped() {
        let active = rule_set_from(date(2023, 1, 1), None);
        let mut inactive = rule_set_from(date(2025, 1, 1), None);
        inactive.active = false;
        let sets = vec![active, inactive];

        let rules = resolve_rules(&sets, "GT", date(2025, 6, 1)).unwrap();
        assert_eq!(rules.effective_from, date(2023, 1, 1));
    }

    #[test]
    fn test_other_jurisdictions_are_ignored() {
        let mut sv = rule_set_from(date(2020, 1, 1), None);
        sv.jurisdiction = "SV".to_string();

        let result = resolve_rules(std::slice::from_ref(&sv), "GT", date(2025, 1, 1));
        match result {
            Err(EngineError::NoApplicableRuleSet { jurisdiction, .. }) => {
                assert_eq!(jurisdiction, "GT");
            }
            other => panic!("Expected NoApplicableRuleSet, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_rule_set_is_valid() {
        assert!(validate_rule_set(&sample_rule_set()).is_ok());
    }

    #[test]
    fn test_rate_out_of_range_is_rejected() {
        let mut rs = sample_rule_set();
        rs.social_security.employee_rate = dec("4.83");

        let err = validate_rule_set(&rs).unwrap_err();
        assert!(err.to_string().contains("social_security.employee_rate"));
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let rs = rule_set_from(date(2025, 1, 1), Some(date(2024, 1, 1)));
        assert!(matches!(
            validate_rule_set(&rs),
            Err(EngineError::InvalidRuleSet { .. })
        ));
    }

    #[test]
    fn test_zero_monthly_hours_is_rejected() {
        let mut rs = sample_rule_set();
        rs.standard_monthly_hours = Decimal::ZERO;
        assert!(validate_rule_set(&rs).is_err());
    }

    #[test]
    fn test_duplicate_active_start_dates_are_ambiguous() {
        let sets = vec![sample_rule_set(), sample_rule_set()];
        assert!(matches!(
            ensure_unambiguous(&sets),
            Err(EngineError::AmbiguousRuleSet { .. })
        ));
    }

    #[test]
    fn test_inactive_duplicate_is_not_ambiguous() {
        let mut inactive = sample_rule_set();
        inactive.active = false;
        assert!(ensure_unambiguous(&[sample_rule_set(), inactive]).is_ok());
    }
}
