//! Compensation inputs for a payroll period.
//!
//! A [`CompensationInput`] carries everything about one employee's period
//! that is not part of the employee master data: hour overrides,
//! commissions, ad-hoc bonuses and recurring deductions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Worked hours that replace the monthly salary as the pay base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourOverrides {
    /// Ordinary hours worked in the period.
    pub regular_hours: Decimal,
    /// Daytime overtime hours.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Night overtime hours.
    #[serde(default)]
    pub night_overtime_hours: Decimal,
    /// Hourly rate; derived from the monthly salary when absent.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Overtime rate; `hourly_rate × overtime_multiplier` when absent.
    #[serde(default)]
    pub overtime_rate: Option<Decimal>,
}

/// Fixed deductions taken verbatim from the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDeductions {
    /// Loan installment.
    #[serde(default)]
    pub loan: Decimal,
    /// Salary advance being recovered.
    #[serde(default)]
    pub advance: Decimal,
    /// Any other agreed deduction.
    #[serde(default)]
    pub other: Decimal,
}

/// Largest monetary amount accepted on any input line.
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

/// Most hours accepted on one hour line: every hour of a 31-day month.
pub fn max_hours() -> Decimal {
    Decimal::from(744)
}

/// Rejects a monetary amount that is negative, above [`max_amount`] or more
/// precise than `decimals` places.
pub(crate) fn check_amount(
    employee_id: &str,
    field: &str,
    value: Decimal,
    decimals: u32,
) -> EngineResult<()> {
    let message = if value < Decimal::ZERO {
        format!("must not be negative, got {}", value)
    } else if value > max_amount() {
        format!("must not exceed {}, got {}", max_amount(), value)
    } else if value.normalize().scale() > decimals {
        format!("must have at most {} decimal places, got {}", decimals, value)
    } else {
        return Ok(());
    };
    Err(EngineError::InvalidCompensationInput {
        employee_id: employee_id.to_string(),
        field: field.to_string(),
        message,
    })
}

impl RecurringDeductions {
    /// Sum of all recurring deductions.
    pub fn total(&self) -> Decimal {
        self.loan + self.advance + self.other
    }
}

/// Per-employee compensation input for a period.
///
/// When `period_label` is `None` the input is recurring and applies to any
/// period without a more specific entry.
///
/// # Example
///
/// ```
/// use nomina_engine::models::CompensationInput;
///
/// let input = CompensationInput::empty("emp_001");
/// assert!(input.validate(2).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationInput {
    /// The employee this input belongs to.
    pub employee_id: String,
    /// Period this input is for, `None` for a recurring input.
    #[serde(default)]
    pub period_label: Option<String>,
    /// Overrides the employee's master monthly salary for the period.
    #[serde(default)]
    pub monthly_salary: Option<Decimal>,
    /// Hour data replacing the monthly salary as base.
    #[serde(default)]
    pub hours: Option<HourOverrides>,
    /// Commission earned in the period.
    #[serde(default)]
    pub commission: Decimal,
    /// Ad-hoc bonus granted in the period.
    #[serde(default)]
    pub ad_hoc_bonus: Decimal,
    /// Recurring fixed deductions.
    #[serde(default)]
    pub deductions: RecurringDeductions,
}

impl CompensationInput {
    /// An input with no overrides, extras or deductions.
    pub fn empty(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            period_label: None,
            monthly_salary: None,
            hours: None,
            commission: Decimal::ZERO,
            ad_hoc_bonus: Decimal::ZERO,
            deductions: RecurringDeductions::default(),
        }
    }

    /// Checks every amount against the rule set's precision and the input
    /// limits.
    ///
    /// Money fields must be non-negative, at most [`max_amount`] and carry no
    /// more than `decimals` decimal places. Hours must lie within
    /// `0..=`[`max_hours`]. An explicit hourly rate must be strictly
    /// positive; a derived rate is checked by the calculator once the rule
    /// set is known.
    pub fn validate(&self, decimals: u32) -> EngineResult<()> {
        let mut amounts: Vec<(&str, Decimal)> = vec![
            ("commission", self.commission),
            ("ad_hoc_bonus", self.ad_hoc_bonus),
            ("deductions.loan", self.deductions.loan),
            ("deductions.advance", self.deductions.advance),
            ("deductions.other", self.deductions.other),
        ];
        if let Some(salary) = self.monthly_salary {
            amounts.push(("monthly_salary", salary));
        }
        for (field, value) in amounts {
            check_amount(&self.employee_id, field, value, decimals)?;
        }

        let Some(hours) = &self.hours else {
            return Ok(());
        };
        for (field, value) in [
            ("hours.regular_hours", hours.regular_hours),
            ("hours.overtime_hours", hours.overtime_hours),
            ("hours.night_overtime_hours", hours.night_overtime_hours),
        ] {
            if value < Decimal::ZERO || value > max_hours() {
                return Err(self.invalid(
                    field,
                    format!("must be between 0 and {}, got {}", max_hours(), value),
                ));
            }
        }
        if let Some(rate) = hours.overtime_rate {
            if rate < Decimal::ZERO || rate > max_amount() {
                return Err(self.invalid(
                    "hours.overtime_rate",
                    format!("must be between 0 and {}, got {}", max_amount(), rate),
                ));
            }
        }
        if let Some(rate) = hours.hourly_rate {
            if rate <= Decimal::ZERO || rate > max_amount() {
                return Err(self.invalid(
                    "hours.hourly_rate",
                    format!("must be greater than zero and at most {}, got {}", max_amount(), rate),
                ));
            }
        }

        Ok(())
    }

    pub(crate) fn invalid(&self, field: &str, message: String) -> EngineError {
        EngineError::InvalidCompensationInput {
            employee_id: self.employee_id.clone(),
            field: field.to_string(),
            message,
        }
    }
}
