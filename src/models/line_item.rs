//! Per-employee payroll line item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AuditStep;

/// The computed breakdown of one employee's pay within a run.
///
/// `gross = base_salary + bonuses` and `net_pay = gross - total_deductions`
/// hold exactly for every line item the engine produces.
///
/// # Example
///
/// ```
/// use nomina_engine::models::PayrollLineItem;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let item = PayrollLineItem {
///     employee_id: "emp_001".to_string(),
///     employee_name: "Ana Morales".to_string(),
///     base_salary: dec("6000.00"),
///     commission: Decimal::ZERO,
///     statutory_bonus: Decimal::ZERO,
///     ad_hoc_bonus: Decimal::ZERO,
///     bonuses: Decimal::ZERO,
///     gross: dec("6000.00"),
///     social_security_employee: dec("241.50"),
///     income_tax: dec("287.93"),
///     loan: Decimal::ZERO,
///     advance: Decimal::ZERO,
///     other_deductions: Decimal::ZERO,
///     total_deductions: dec("529.43"),
///     net_pay: dec("5470.57"),
///     notes: None,
///     trace: vec![],
/// };
/// assert!(item.is_balanced());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLineItem {
    /// The employee this line item pays.
    pub employee_id: String,
    /// The employee's name at calculation time.
    pub employee_name: String,
    /// Salary base (monthly salary, hours × rate, or 12-month average).
    pub base_salary: Decimal,
    /// Commission for the period.
    pub commission: Decimal,
    /// Statutory incentive bonus (ordinary runs only).
    pub statutory_bonus: Decimal,
    /// Ad-hoc bonus for the period.
    pub ad_hoc_bonus: Decimal,
    /// Sum of commission, statutory bonus and ad-hoc bonus.
    pub bonuses: Decimal,
    /// Base plus bonuses.
    pub gross: Decimal,
    /// IGSS employee contribution.
    pub social_security_employee: Decimal,
    /// ISR withholding.
    pub income_tax: Decimal,
    /// Loan installment.
    pub loan: Decimal,
    /// Advance recovery.
    pub advance: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// Sum of every deduction.
    pub total_deductions: Decimal,
    /// Gross minus total deductions.
    pub net_pay: Decimal,
    /// Free-text notes added through an amendment.
    #[serde(default)]
    pub notes: Option<String>,
    /// Step-by-step calculation trace.
    #[serde(default)]
    pub trace: Vec<AuditStep>,
}

impl PayrollLineItem {
    /// Recomputes `total_deductions` and `net_pay` from the individual lines.
    pub fn rebalance(&mut self) {
        self.total_deductions = self.social_security_employee
            + self.income_tax
            + self.loan
            + self.advance
            + self.other_deductions;
        self.net_pay = self.gross - self.total_deductions;
    }

    /// Returns true if the derived amounts agree with their components.
    pub fn is_balanced(&self) -> bool {
        let deductions = self.social_security_employee
            + self.income_tax
            + self.loan
            + self.advance
            + self.other_deductions;
        self.gross == self.base_salary + self.bonuses
            && self.bonuses == self.commission + self.statutory_bonus + self.ad_hoc_bonus
            && self.total_deductions == deductions
            && self.net_pay == self.gross - deductions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_item() -> PayrollLineItem {
        PayrollLineItem {
            employee_id: "emp_001".to_string(),
            employee_name: "Ana Morales".to_string(),
            base_salary: dec("6000.00"),
            commission: dec("100.00"),
            statutory_bonus: dec("250.00"),
            ad_hoc_bonus: Decimal::ZERO,
            bonuses: dec("350.00"),
            gross: dec("6350.00"),
            social_security_employee: dec("241.50"),
            income_tax: dec("305.43"),
            loan: dec("200.00"),
            advance: Decimal::ZERO,
            other_deductions: Decimal::ZERO,
            total_deductions: dec("746.93"),
            net_pay: dec("5603.07"),
            notes: None,
            trace: vec![],
        }
    }

    #[test]
    fn test_sample_item_is_balanced() {
        assert!(sample_item().is_balanced());
    }

    #[test]
    fn test_rebalance_after_deduction_change() {
        let mut item = sample_item();
        item.loan = dec("50.00");
        assert!(!item.is_balanced());

        item.rebalance();

        assert!(item.is_balanced());
        assert_eq!(item.total_deductions, dec("596.93"));
        assert_eq!(item.net_pay, dec("5753.07"));
    }

    #[test]
    fn test_line_item_serializes_amounts_as_strings() {
        let json = serde_json::to_string(&sample_item()).unwrap();
        assert!(json.contains("\"net_pay\":\"5603.07\""));
        assert!(json.contains("\"employee_id\":\"emp_001\""));
    }
}
