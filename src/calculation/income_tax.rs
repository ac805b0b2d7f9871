//! ISR withholding for a line item.
//!
//! Ordinary and extraordinary runs tax `gross - social_security`. Annual
//! bonus runs are exempt up to a yearly threshold shared by every payment of
//! the same bonus type in the calendar year.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::LegalRuleSet;
use crate::error::EngineResult;
use crate::models::{AuditStep, RunType};

use super::{PayHistory, compute_tax, marginal_rate};

const ISR_LEGAL_REF: &str = "Decreto 10-2012, Libro I";

/// The result of the income-tax step.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// Tax withheld.
    pub amount: Decimal,
    /// The base the bracket table was applied to.
    pub taxable_base: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Computes the income tax of one line item.
///
/// `social_security` is the employee contribution already computed for the
/// line item; it is ignored for annual bonus runs.
#[allow(clippy::too_many_arguments)]
pub fn calculate_income_tax(
    employee_id: &str,
    gross: Decimal,
    social_security: Decimal,
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    if run_type.is_annual_bonus() {
        return annual_bonus_tax(employee_id, gross, run_type, rules, cutoff, history, step_number);
    }

    let taxable_base = gross - social_security;
    let amount = compute_tax(
        taxable_base,
        &rules.tax_brackets,
        rules.rounding.decimals,
        rules.rounding.policy,
    );
    let rate = marginal_rate(taxable_base, &rules.tax_brackets);

    Ok(IncomeTaxResult {
        amount,
        taxable_base,
        audit_step: AuditStep {
            step_number,
            rule_id: "income_tax".to_string(),
            rule_name: "ISR Withholding".to_string(),
            legal_ref: ISR_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "gross": gross.to_string(),
                "social_security_employee": social_security.to_string()
            }),
            output: serde_json::json!({
                "taxable_base": taxable_base.to_string(),
                "marginal_rate": rate.to_string(),
                "income_tax": amount.to_string()
            }),
            reasoning: format!(
                "Taxable base Q{} - Q{} = Q{}; marginal rate {} gives Q{}",
                gross, social_security, taxable_base, rate, amount
            ),
        },
    })
}

fn annual_bonus_tax(
    employee_id: &str,
    gross: Decimal,
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    let year = cutoff.year();
    let accumulated = history.accumulated_annual_bonus(employee_id, run_type, year)?;
    let threshold = rules.annual_bonus_exemption;
    let year_total = accumulated + gross;

    let (taxable_base, amount, reasoning) = if year_total <= threshold {
        (
            Decimal::ZERO,
            Decimal::ZERO,
            format!(
                "{} paid in {} totals Q{} (Q{} earlier plus Q{} now), within the Q{} exemption",
                run_type, year, year_total, accumulated, gross, threshold
            ),
        )
    } else {
        let taxable_base = gross.min(year_total - threshold);
        let amount = compute_tax(
            taxable_base,
            &rules.tax_brackets,
            rules.rounding.decimals,
            rules.rounding.policy,
        );
        (
            taxable_base,
            amount,
            format!(
                "{} paid in {} totals Q{}, Q{} above the Q{} exemption; tax on Q{} is Q{}",
                run_type,
                year,
                year_total,
                year_total - threshold,
                threshold,
                taxable_base,
                amount
            ),
        )
    };

    Ok(IncomeTaxResult {
        amount,
        taxable_base,
        audit_step: AuditStep {
            step_number,
            rule_id: "income_tax_annual_bonus".to_string(),
            rule_name: "ISR on Annual Bonus".to_string(),
            legal_ref: format!("{}; Decreto 10-2012, art. 72", ISR_LEGAL_REF),
            input: serde_json::json!({
                "gross": gross.to_string(),
                "accumulated_in_year": accumulated.to_string(),
                "year": year,
                "exemption_threshold": threshold.to_string()
            }),
            output: serde_json::json!({
                "taxable_base": taxable_base.to_string(),
                "income_tax": amount.to_string()
            }),
            reasoning,
        },
    })
}
