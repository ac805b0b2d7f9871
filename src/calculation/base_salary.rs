//! Salary base determination.
//!
//! This module decides what an employee's pay base is for a run: the monthly
//! salary, worked hours priced at the hourly and overtime rates, or, for the
//! annual statutory bonuses, the average ordinary base of the trailing year.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::LegalRuleSet;
use crate::error::EngineResult;
use crate::models::{AuditStep, CompensationInput, Employee, HourOverrides, RunType};

use super::PayHistory;

/// The result of base determination, including the amount and audit step.
#[derive(Debug, Clone)]
pub struct BaseSalaryResult {
    /// The salary base.
    pub amount: Decimal,
    /// The audit step recording the decision.
    pub audit_step: AuditStep,
}

/// Determines the salary base for one employee in one run.
///
/// * `ORDINARY`/`EXTRAORDINARY`: the monthly salary (input override first,
///   then master data), unless hour data is supplied, in which case
///   `regular × rate + overtime × overtime_rate + night × rate × night_multiplier`.
///   A missing hourly rate is derived as `salary / standard_monthly_hours`.
/// * `ANNUAL_BONUS_13`/`ANNUAL_BONUS_14`: the average base of the
///   employee's ordinary line items in the twelve months ending at `cutoff`,
///   or zero without history.
pub fn determine_base_salary(
    employee: &Employee,
    input: &CompensationInput,
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
    step_number: u32,
) -> EngineResult<BaseSalaryResult> {
    if run_type.is_annual_bonus() {
        return average_base(employee, run_type, rules, cutoff, history, step_number);
    }

    let monthly_salary = input.monthly_salary.unwrap_or(employee.monthly_salary);
    let source = if input.monthly_salary.is_some() {
        "input_override"
    } else {
        "employee_master"
    };

    match &input.hours {
        Some(hours) => hourly_base(input, hours, monthly_salary, rules, step_number),
        None => Ok(BaseSalaryResult {
            amount: monthly_salary,
            audit_step: AuditStep {
                step_number,
                rule_id: "base_salary".to_string(),
                rule_name: "Monthly Salary Base".to_string(),
                legal_ref: "Código de Trabajo, art. 88".to_string(),
                input: serde_json::json!({
                    "employee_id": employee.id,
                    "monthly_salary": monthly_salary.to_string(),
                    "run_type": run_type.as_str()
                }),
                output: serde_json::json!({
                    "base_salary": monthly_salary.to_string(),
                    "source": source
                }),
                reasoning: format!("Using monthly salary Q{} as base", monthly_salary),
            },
        }),
    }
}

fn hourly_base(
    input: &CompensationInput,
    hours: &HourOverrides,
    monthly_salary: Decimal,
    rules: &LegalRuleSet,
    step_number: u32,
) -> EngineResult<BaseSalaryResult> {
    let hourly_rate = match hours.hourly_rate {
        Some(rate) => rate,
        None => rules.round(monthly_salary / rules.standard_monthly_hours),
    };
    if hourly_rate <= Decimal::ZERO {
        return Err(input.invalid(
            "hours.hourly_rate",
            "derived hourly rate must be greater than zero".to_string(),
        ));
    }

    let overflow = || input.invalid("hours", "hour pay overflows".to_string());
    let overtime_rate = match hours.overtime_rate {
        Some(rate) => rate,
        None => hourly_rate
            .checked_mul(rules.overtime_multiplier)
            .ok_or_else(overflow)?,
    };
    let night_rate = hourly_rate
        .checked_mul(rules.overtime_night_multiplier)
        .ok_or_else(overflow)?;
    let rate_source = if hours.hourly_rate.is_some() {
        "input"
    } else {
        "derived"
    };

    let amount = hours
        .regular_hours
        .checked_mul(hourly_rate)
        .zip(hours.overtime_hours.checked_mul(overtime_rate))
        .zip(hours.night_overtime_hours.checked_mul(night_rate))
        .and_then(|((regular, overtime), night)| regular.checked_add(overtime)?.checked_add(night))
        .map(|total| rules.round(total))
        .ok_or_else(overflow)?;

    Ok(BaseSalaryResult {
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "base_salary_hours".to_string(),
            rule_name: "Hourly Salary Base".to_string(),
            legal_ref: "Código de Trabajo, arts. 121-122".to_string(),
            input: serde_json::json!({
                "regular_hours": hours.regular_hours.to_string(),
                "overtime_hours": hours.overtime_hours.to_string(),
                "night_overtime_hours": hours.night_overtime_hours.to_string(),
                "hourly_rate": hourly_rate.to_string(),
                "hourly_rate_source": rate_source,
                "overtime_rate": overtime_rate.to_string(),
                "night_overtime_rate": night_rate.to_string()
            }),
            output: serde_json::json!({
                "base_salary": amount.to_string()
            }),
            reasoning: format!(
                "{} regular hours at Q{} plus {} overtime hours at Q{} plus {} night overtime hours at Q{} = Q{}",
                hours.regular_hours.normalize(),
                hourly_rate,
                hours.overtime_hours.normalize(),
                overtime_rate.normalize(),
                hours.night_overtime_hours.normalize(),
                night_rate.normalize(),
                amount
            ),
        },
    })
}

fn average_base(
    employee: &Employee,
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
    step_number: u32,
) -> EngineResult<BaseSalaryResult> {
    let bases = history.trailing_ordinary_bases(&employee.id, cutoff)?;
    let amount = if bases.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = bases.iter().sum();
        rules.round(sum / Decimal::from(bases.len()))
    };

    let legal_ref = match run_type {
        RunType::AnnualBonus13 => "Decreto 76-78, art. 1",
        _ => "Decreto 42-92, art. 2",
    };

    Ok(BaseSalaryResult {
        amount,
        audit_step: AuditStep {
            step_number,
            rule_id: "base_salary_average".to_string(),
            rule_name: "Trailing Twelve-Month Average Base".to_string(),
            legal_ref: legal_ref.to_string(),
            input: serde_json::json!({
                "employee_id": employee.id,
                "cutoff_date": cutoff.to_string(),
                "ordinary_runs": bases.len()
            }),
            output: serde_json::json!({
                "base_salary": amount.to_string()
            }),
            reasoning: if bases.is_empty() {
                "No ordinary runs in the trailing twelve months; base is zero".to_string()
            } else {
                format!(
                    "Average of {} ordinary bases ending {} is Q{}",
                    bases.len(),
                    cutoff,
                    amount
                )
            },
        },
    })
}
