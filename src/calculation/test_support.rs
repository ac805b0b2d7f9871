//! Shared fixtures for unit tests.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::config::{
    LegalRuleSet, ProvisionRates, RoundingConfig, RoundingPolicy, SocialSecurityRates, TaxBracket,
};
use crate::error::EngineResult;
use crate::models::{
    Employee, EmploymentStatus, PayrollLineItem, PayrollRun, PayrollRunPreview, PeriodInput,
    RunCalculation, RunState, RunTotals, RunType,
};

use super::PayHistory;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// IGSS 4.83% / 10.67% capped at Q5,000, flat 5% up to Q48,000.
pub fn sample_rule_set() -> LegalRuleSet {
    LegalRuleSet {
        jurisdiction: "GT".to_string(),
        effective_from: date(2024, 1, 1),
        effective_to: None,
        active: true,
        social_security: SocialSecurityRates {
            employee_rate: dec("0.0483"),
            employer_rate: dec("0.1067"),
            max_contribution_base: dec("5000.00"),
        },
        training_fund_rate: dec("0.01"),
        recreation_fund_rate: dec("0.01"),
        tax_brackets: vec![
            TaxBracket {
                lower_bound: Decimal::ZERO,
                upper_bound: Some(dec("48000.00")),
                marginal_rate: dec("0.05"),
                base_tax: Decimal::ZERO,
            },
            TaxBracket {
                lower_bound: dec("48000.00"),
                upper_bound: None,
                marginal_rate: dec("0.07"),
                base_tax: dec("2400.00"),
            },
        ],
        overtime_multiplier: dec("1.5"),
        overtime_night_multiplier: dec("2.0"),
        statutory_bonus: dec("250.00"),
        annual_bonus_exemption: dec("60000.00"),
        provisions: ProvisionRates {
            aguinaldo: dec("0.0833"),
            bono14: dec("0.0833"),
            vacation: dec("0.0417"),
            severance: dec("0.0972"),
        },
        standard_monthly_hours: dec("240"),
        rounding: RoundingConfig {
            decimals: 2,
            policy: RoundingPolicy::HalfAwayFromZero,
        },
    }
}

pub fn sample_employee(id: &str, salary: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Empleado {}", id),
        monthly_salary: dec(salary),
        status: EmploymentStatus::Active,
        department_id: Some("finanzas".to_string()),
    }
}

/// A history returning the same answers for every employee.
#[derive(Debug, Clone, Default)]
pub struct FixedHistory {
    pub bases: Vec<Decimal>,
    pub accumulated: Decimal,
}

impl PayHistory for FixedHistory {
    fn trailing_ordinary_bases(&self, _: &str, _: NaiveDate) -> EngineResult<Vec<Decimal>> {
        Ok(self.bases.clone())
    }

    fn accumulated_annual_bonus(&self, _: &str, _: RunType, _: i32) -> EngineResult<Decimal> {
        Ok(self.accumulated)
    }
}

/// A balanced line item with no bonuses or deductions.
pub fn sample_line_item(employee_id: &str, gross: &str) -> PayrollLineItem {
    PayrollLineItem {
        employee_id: employee_id.to_string(),
        employee_name: format!("Empleado {}", employee_id),
        base_salary: dec(gross),
        commission: Decimal::ZERO,
        statutory_bonus: Decimal::ZERO,
        ad_hoc_bonus: Decimal::ZERO,
        bonuses: Decimal::ZERO,
        gross: dec(gross),
        social_security_employee: Decimal::ZERO,
        income_tax: Decimal::ZERO,
        loan: Decimal::ZERO,
        advance: Decimal::ZERO,
        other_deductions: Decimal::ZERO,
        total_deductions: Decimal::ZERO,
        net_pay: dec(gross),
        notes: None,
        trace: vec![],
    }
}

/// A run in `state` holding the given line items.
pub fn sample_run(
    period_label: &str,
    run_type: RunType,
    cutoff: NaiveDate,
    state: RunState,
    line_items: Vec<PayrollLineItem>,
) -> PayrollRun {
    let input = PeriodInput::new(period_label, run_type).with_cutoff(cutoff);
    let preview = PayrollRunPreview {
        period_label: period_label.to_string(),
        run_type,
        jurisdiction: "GT".to_string(),
        cutoff_date: cutoff,
        calculation: RunCalculation {
            rule_set_effective_from: date(2024, 1, 1),
            totals: RunTotals::from_line_items(&line_items),
            employee_count: line_items.len(),
            line_items,
            employer_contributions: Default::default(),
            warnings: vec![],
        },
    };
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let mut run = PayrollRun::new_draft(preview, &input, now);
    run.state = state;
    run
}
