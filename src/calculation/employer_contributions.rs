//! Employer-side contributions of a run.
//!
//! Derived from the run's line items and rule set only. Training (INTECAP)
//! and recreation (IRTRA) funds and the end-of-year provisions apply to
//! ordinary runs; IGSS employer contributions apply to every run type.

use rust_decimal::Decimal;

use crate::config::LegalRuleSet;
use crate::models::{EmployerContributionSummary, PayrollLineItem, RunType, StatutoryProvisions};

use super::employer_social_security;

/// Computes the employer contribution summary for a set of line items.
///
/// IGSS caps each employee's gross at the maximum contribution base before
/// summing. Fund and provision rates apply to the uncapped total gross.
pub fn calculate_employer_contributions(
    line_items: &[PayrollLineItem],
    run_type: RunType,
    rules: &LegalRuleSet,
) -> EmployerContributionSummary {
    let social_security = employer_social_security(line_items.iter().map(|i| &i.gross), rules);

    if run_type != RunType::Ordinary {
        return EmployerContributionSummary {
            social_security,
            training_fund: Decimal::ZERO,
            recreation_fund: Decimal::ZERO,
            provisions: None,
        };
    }

    let total_gross: Decimal = line_items.iter().map(|i| i.gross).sum();
    let provisions = &rules.provisions;

    EmployerContributionSummary {
        social_security,
        training_fund: rules.round(total_gross * rules.training_fund_rate),
        recreation_fund: rules.round(total_gross * rules.recreation_fund_rate),
        provisions: Some(StatutoryProvisions {
            aguinaldo: rules.round(total_gross * provisions.aguinaldo),
            bono14: rules.round(total_gross * provisions.bono14),
            vacation: rules.round(total_gross * provisions.vacation),
            severance: rules.round(total_gross * provisions.severance),
        }),
    }
}
