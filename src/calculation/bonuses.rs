//! Bonus assembly.
//!
//! Adds the statutory incentive bonus (ordinary runs only), commissions and
//! ad-hoc bonuses into the `bonuses` component of gross pay.

use rust_decimal::Decimal;

use crate::config::LegalRuleSet;
use crate::models::{AuditStep, CompensationInput, RunType};

/// The assembled bonuses of one line item.
#[derive(Debug, Clone)]
pub struct BonusAssembly {
    /// Statutory incentive bonus, zero outside ordinary runs.
    pub statutory_bonus: Decimal,
    /// Commission from the input.
    pub commission: Decimal,
    /// Ad-hoc bonus from the input.
    pub ad_hoc_bonus: Decimal,
    /// Sum of the three.
    pub total: Decimal,
    /// The audit step recording the assembly.
    pub audit_step: AuditStep,
}

/// Assembles the bonuses for one employee.
///
/// # Examples
///
/// ```no_run
/// use nomina_engine::calculation::assemble_bonuses;
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{CompensationInput, RunType};
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/gt").unwrap();
/// let rules = loader.resolve("GT", NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()).unwrap();
/// let result = assemble_bonuses(&CompensationInput::empty("emp_001"), RunType::Ordinary, &rules, 2);
/// assert_eq!(result.total, rules.statutory_bonus);
/// ```
pub fn assemble_bonuses(
    input: &CompensationInput,
    run_type: RunType,
    rules: &LegalRuleSet,
    step_number: u32,
) -> BonusAssembly {
    let statutory_bonus = if run_type == RunType::Ordinary {
        rules.statutory_bonus
    } else {
        Decimal::ZERO
    };
    let total = statutory_bonus + input.commission + input.ad_hoc_bonus;

    let reasoning = if run_type == RunType::Ordinary {
        format!(
            "Statutory bonus Q{} plus commission Q{} plus ad-hoc bonus Q{} = Q{}",
            statutory_bonus, input.commission, input.ad_hoc_bonus, total
        )
    } else {
        format!(
            "Statutory bonus does not apply to {} runs; commission Q{} plus ad-hoc bonus Q{} = Q{}",
            run_type, input.commission, input.ad_hoc_bonus, total
        )
    };

    BonusAssembly {
        statutory_bonus,
        commission: input.commission,
        ad_hoc_bonus: input.ad_hoc_bonus,
        total,
        audit_step: AuditStep {
            step_number,
            rule_id: "bonus_assembly".to_string(),
            rule_name: "Bonus Assembly".to_string(),
            legal_ref: "Decreto 37-2001".to_string(),
            input: serde_json::json!({
                "run_type": run_type.as_str(),
                "statutory_bonus": rules.statutory_bonus.to_string(),
                "commission": input.commission.to_string(),
                "ad_hoc_bonus": input.ad_hoc_bonus.to_string()
            }),
            output: serde_json::json!({
                "statutory_bonus": statutory_bonus.to_string(),
                "bonuses": total.to_string()
            }),
            reasoning,
        },
    }
}
