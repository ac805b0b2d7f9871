//! IGSS social-security contributions.
//!
//! Both the employee deduction and the employer contribution are computed on
//! a base capped at the rule set's maximum contribution base. Annual bonus
//! runs are exempt from the employee deduction.

use rust_decimal::Decimal;

use crate::config::LegalRuleSet;
use crate::models::{AuditStep, RunType};

const IGSS_LEGAL_REF: &str = "Acuerdo 1118 de Junta Directiva del IGSS";

/// The result of the employee social-security calculation.
#[derive(Debug, Clone)]
pub struct SocialSecurityResult {
    /// The deduction.
    pub amount: Decimal,
    /// The capped base the rate was applied to.
    pub contribution_base: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Caps a gross amount at the rule set's maximum contribution base.
pub fn capped_contribution_base(gross: Decimal, rules: &LegalRuleSet) -> Decimal {
    gross.min(rules.social_security.max_contribution_base)
}

/// Computes the employee social-security deduction.
///
/// `min(gross, max_contribution_base) × employee_rate`, rounded; zero for
/// `ANNUAL_BONUS_13`/`ANNUAL_BONUS_14` runs.
pub fn calculate_employee_social_security(
    gross: Decimal,
    run_type: RunType,
    rules: &LegalRuleSet,
    step_number: u32,
) -> SocialSecurityResult {
    let rate = rules.social_security.employee_rate;
    let cap = rules.social_security.max_contribution_base;

    if run_type.is_annual_bonus() {
        return SocialSecurityResult {
            amount: Decimal::ZERO,
            contribution_base: Decimal::ZERO,
            audit_step: AuditStep {
                step_number,
                rule_id: "social_security_employee".to_string(),
                rule_name: "IGSS Employee Contribution".to_string(),
                legal_ref: IGSS_LEGAL_REF.to_string(),
                input: serde_json::json!({
                    "gross": gross.to_string(),
                    "run_type": run_type.as_str()
                }),
                output: serde_json::json!({
                    "amount": "0",
                    "exempt": true
                }),
                reasoning: format!("{} runs are exempt from IGSS contributions", run_type),
            },
        };
    }

    let contribution_base = capped_contribution_base(gross, rules);
    let amount = rules.round(contribution_base * rate);

    let reasoning = if gross > cap {
        format!(
            "Gross Q{} exceeds cap Q{}; Q{} × {} = Q{}",
            gross, cap, contribution_base, rate, amount
        )
    } else {
        format!("Q{} × {} = Q{}", contribution_base, rate, amount)
    };

    SocialSecurityResult {
        amount,
        contribution_base,
        audit_step: AuditStep {
            step_number,
            rule_id: "social_security_employee".to_string(),
            rule_name: "IGSS Employee Contribution".to_string(),
            legal_ref: IGSS_LEGAL_REF.to_string(),
            input: serde_json::json!({
                "gross": gross.to_string(),
                "max_contribution_base": cap.to_string(),
                "employee_rate": rate.to_string()
            }),
            output: serde_json::json!({
                "contribution_base": contribution_base.to_string(),
                "amount": amount.to_string()
            }),
            reasoning,
        },
    }
}

/// Computes the employer social-security contribution for a set of gross
/// amounts, capping each one individually before applying the rate.
pub fn employer_social_security<'a, I>(grosses: I, rules: &LegalRuleSet) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    let capped: Decimal = grosses
        .into_iter()
        .map(|gross| capped_contribution_base(*gross, rules))
        .sum();
    rules.round(capped * rules.social_security.employer_rate)
}
