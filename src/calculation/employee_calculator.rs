//! Per-employee calculation pipeline.
//!
//! Runs the seven steps that turn one employee's master data and
//! compensation input into a [`PayrollLineItem`], recording every step in the
//! line item's trace.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::LegalRuleSet;
use crate::error::EngineResult;
use crate::models::{AuditStep, CompensationInput, Employee, PayrollLineItem, RunType, check_amount};

use super::{
    PayHistory, assemble_bonuses, calculate_employee_social_security, calculate_income_tax,
    determine_base_salary,
};

/// Calculates one employee's line item for a run.
///
/// The input is validated before anything is computed; an invalid input
/// fails the employee with `InvalidCompensationInput`.
///
/// # Examples
///
/// ```no_run
/// use nomina_engine::calculation::{NoHistory, calculate_employee};
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{CompensationInput, Employee, EmploymentStatus, RunType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/gt").unwrap();
/// let cutoff = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// let rules = loader.resolve("GT", cutoff).unwrap();
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Ana Morales".to_string(),
///     monthly_salary: Decimal::new(600000, 2),
///     status: EmploymentStatus::Active,
///     department_id: None,
/// };
///
/// let item = calculate_employee(
///     &employee,
///     &CompensationInput::empty("emp_001"),
///     RunType::Ordinary,
///     &rules,
///     cutoff,
///     &NoHistory,
/// )
/// .unwrap();
/// assert!(item.is_balanced());
/// ```
pub fn calculate_employee(
    employee: &Employee,
    input: &CompensationInput,
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
) -> EngineResult<PayrollLineItem> {
    input.validate(rules.rounding.decimals)?;
    check_amount(
        &employee.id,
        "monthly_salary",
        employee.monthly_salary,
        rules.rounding.decimals,
    )?;

    let mut trace = Vec::with_capacity(7);

    // Step 1: base
    let base = determine_base_salary(employee, input, run_type, rules, cutoff, history, 1)?;
    trace.push(base.audit_step);

    // Step 2: bonuses
    let bonuses = assemble_bonuses(input, run_type, rules, 2);
    trace.push(bonuses.audit_step);

    // Step 3: gross
    let gross = base
        .amount
        .checked_add(bonuses.total)
        .ok_or_else(|| input.invalid("gross", "base plus bonuses overflows".to_string()))?;
    trace.push(AuditStep {
        step_number: 3,
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        legal_ref: "Código de Trabajo, art. 88".to_string(),
        input: serde_json::json!({
            "base_salary": base.amount.to_string(),
            "bonuses": bonuses.total.to_string()
        }),
        output: serde_json::json!({
            "gross": gross.to_string()
        }),
        reasoning: format!("Q{} + Q{} = Q{}", base.amount, bonuses.total, gross),
    });

    // Step 4: IGSS
    let social_security = calculate_employee_social_security(gross, run_type, rules, 4);
    trace.push(social_security.audit_step);

    // Step 5: ISR
    let income_tax = calculate_income_tax(
        &employee.id,
        gross,
        social_security.amount,
        run_type,
        rules,
        cutoff,
        history,
        5,
    )?;
    trace.push(income_tax.audit_step);

    // Step 6: verbatim deductions
    let deductions = &input.deductions;
    trace.push(AuditStep {
        step_number: 6,
        rule_id: "other_deductions".to_string(),
        rule_name: "Loan, Advance and Other Deductions".to_string(),
        legal_ref: "Código de Trabajo, art. 99".to_string(),
        input: serde_json::json!({
            "loan": deductions.loan.to_string(),
            "advance": deductions.advance.to_string(),
            "other": deductions.other.to_string()
        }),
        output: serde_json::json!({
            "total": deductions.total().to_string()
        }),
        reasoning: format!(
            "Loan Q{} + advance Q{} + other Q{} = Q{}",
            deductions.loan,
            deductions.advance,
            deductions.other,
            deductions.total()
        ),
    });

    let mut item = PayrollLineItem {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        base_salary: base.amount,
        commission: bonuses.commission,
        statutory_bonus: bonuses.statutory_bonus,
        ad_hoc_bonus: bonuses.ad_hoc_bonus,
        bonuses: bonuses.total,
        gross,
        social_security_employee: social_security.amount,
        income_tax: income_tax.amount,
        loan: deductions.loan,
        advance: deductions.advance,
        other_deductions: deductions.other,
        total_deductions: Decimal::ZERO,
        net_pay: Decimal::ZERO,
        notes: None,
        trace: Vec::new(),
    };

    // Step 7: totals
    item.rebalance();
    trace.push(AuditStep {
        step_number: 7,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        legal_ref: "Código de Trabajo, art. 93".to_string(),
        input: serde_json::json!({
            "gross": gross.to_string(),
            "social_security_employee": item.social_security_employee.to_string(),
            "income_tax": item.income_tax.to_string(),
            "other_deductions": deductions.total().to_string()
        }),
        output: serde_json::json!({
            "total_deductions": item.total_deductions.to_string(),
            "net_pay": item.net_pay.to_string()
        }),
        reasoning: format!(
            "Q{} - Q{} = Q{}",
            gross, item.total_deductions, item.net_pay
        ),
    });
    item.trace = trace;

    debug!(
        employee_id = %item.employee_id,
        run_type = %run_type,
        gross = %item.gross,
        net_pay = %item.net_pay,
        "Employee calculated"
    );

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::NoHistory;
    use crate::calculation::test_support::{FixedHistory, date, dec, sample_employee, sample_rule_set};
    use crate::error::EngineError;
    use crate::models::HourOverrides;
    use proptest::prelude::*;

    /// The rule set without a statutory bonus, to match the plain-salary examples.
    fn rules_without_bonus() -> LegalRuleSet {
        let mut rules = sample_rule_set();
        rules.statutory_bonus = Decimal::ZERO;
        rules
    }

    fn calculate(
        input: &CompensationInput,
        run_type: RunType,
        rules: &LegalRuleSet,
        history: &dyn PayHistory,
    ) -> EngineResult<PayrollLineItem> {
        calculate_employee(
            &sample_employee("emp_001", "6000.00"),
            input,
            run_type,
            rules,
            date(2025, 6, 30),
            history,
        )
    }

    #[test]
    fn test_ordinary_salary_example() {
        let item = calculate(
            &CompensationInput::empty("emp_001"),
            RunType::Ordinary,
            &rules_without_bonus(),
            &NoHistory,
        )
        .unwrap();

        assert_eq!(item.gross, dec("6000.00"));
        assert_eq!(item.social_security_employee, dec("241.50"));
        assert_eq!(item.income_tax, dec("287.93"));
        assert_eq!(item.total_deductions, dec("529.43"));
        assert_eq!(item.net_pay, dec("5470.57"));
        assert!(item.is_balanced());
    }

    #[test]
    fn test_bono_14_example() {
        let history = FixedHistory {
            bases: vec![dec("6000.00"); 12],
            accumulated: Decimal::ZERO,
        };

        let item = calculate(
            &CompensationInput::empty("emp_001"),
            RunType::AnnualBonus14,
            &sample_rule_set(),
            &history,
        )
        .unwrap();

        assert_eq!(item.base_salary, dec("6000.00"));
        assert_eq!(item.statutory_bonus, Decimal::ZERO);
        assert_eq!(item.social_security_employee, Decimal::ZERO);
        assert_eq!(item.income_tax, Decimal::ZERO);
        assert_eq!(item.net_pay, dec("6000.00"));
    }

    #[test]
    fn test_statutory_bonus_and_deductions() {
        let mut input = CompensationInput::empty("emp_001");
        input.commission = dec("350.00");
        input.deductions.loan = dec("200.00");
        input.deductions.advance = dec("150.00");

        let item = calculate(&input, RunType::Ordinary, &sample_rule_set(), &NoHistory).unwrap();

        assert_eq!(item.bonuses, dec("600.00"));
        assert_eq!(item.gross, dec("6600.00"));
        // capped at 5000
        assert_eq!(item.social_security_employee, dec("241.50"));
        // (6600 - 241.50) × 0.05 = 317.925
        assert_eq!(item.income_tax, dec("317.93"));
        assert_eq!(item.total_deductions, dec("909.43"));
        assert_eq!(item.net_pay, dec("5690.57"));
    }

    #[test]
    fn test_trace_has_seven_ordered_steps() {
        let item = calculate(
            &CompensationInput::empty("emp_001"),
            RunType::Ordinary,
            &sample_rule_set(),
            &NoHistory,
        )
        .unwrap();

        let numbers: Vec<u32> = item.trace.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(item.trace[0].rule_id, "base_salary");
        assert_eq!(item.trace[6].rule_id, "net_pay");
        assert_eq!(item.trace[6].output["net_pay"], item.net_pay.to_string());
    }

    #[test]
    fn test_extraordinary_run_has_no_statutory_bonus() {
        let mut input = CompensationInput::empty("emp_001");
        input.ad_hoc_bonus = dec("500.00");

        let item = calculate(&input, RunType::Extraordinary, &sample_rule_set(), &NoHistory).unwrap();

        assert_eq!(item.statutory_bonus, Decimal::ZERO);
        assert_eq!(item.gross, dec("6500.00"));
        assert!(item.social_security_employee > Decimal::ZERO);
    }

    #[test]
    fn test_invalid_input_fails_before_calculation() {
        let mut input = CompensationInput::empty("emp_001");
        input.hours = Some(HourOverrides {
            regular_hours: dec("-1"),
            overtime_hours: Decimal::ZERO,
            night_overtime_hours: Decimal::ZERO,
            hourly_rate: Some(dec("20.00")),
            overtime_rate: None,
        });

        match calculate(&input, RunType::Ordinary, &sample_rule_set(), &NoHistory) {
            Err(EngineError::InvalidCompensationInput { employee_id, field, .. }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(field, "hours.regular_hours");
            }
            other => panic!("Expected InvalidCompensationInput, got {:?}", other),
        }
    }

    #[test]
    fn test_sub_cent_deduction_is_rejected() {
        let mut input = CompensationInput::empty("emp_001");
        input.deductions.loan = dec("10.005");

        match calculate(&input, RunType::Ordinary, &sample_rule_set(), &NoHistory) {
            Err(EngineError::InvalidCompensationInput { field, .. }) => {
                assert_eq!(field, "deductions.loan")
            }
            other => panic!("Expected InvalidCompensationInput, got {:?}", other),
        }
    }

    #[test]
    fn test_master_salary_finer_than_rule_precision_is_rejected() {
        let employee = sample_employee("emp_001", "6000.125");

        let result = calculate_employee(
            &employee,
            &CompensationInput::empty("emp_001"),
            RunType::Ordinary,
            &sample_rule_set(),
            date(2025, 6, 30),
            &NoHistory,
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidCompensationInput { ref field, .. }) if field == "monthly_salary"
        ));
    }

    #[test]
    fn test_maximal_commission_is_an_error_not_a_panic() {
        let mut input = CompensationInput::empty("emp_001");
        input.commission = Decimal::MAX;

        assert!(matches!(
            calculate(&input, RunType::Ordinary, &sample_rule_set(), &NoHistory),
            Err(EngineError::InvalidCompensationInput { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_ordinary_net_identity(
            salary_cents in 0i64..5_000_000,
            commission_cents in 0i64..500_000,
            loan_cents in 0i64..200_000,
            other_cents in 0i64..100_000,
        ) {
            let rules = sample_rule_set();
            let employee = Employee {
                monthly_salary: Decimal::new(salary_cents, 2),
                ..sample_employee("emp_001", "0")
            };
            let mut input = CompensationInput::empty("emp_001");
            input.commission = Decimal::new(commission_cents, 2);
            input.deductions.loan = Decimal::new(loan_cents, 2);
            input.deductions.other = Decimal::new(other_cents, 2);

            let item = calculate_employee(
                &employee, &input, RunType::Ordinary, &rules, date(2025, 6, 30), &NoHistory,
            ).unwrap();

            prop_assert_eq!(item.gross, item.base_salary + item.bonuses);
            prop_assert_eq!(
                item.net_pay,
                item.gross - item.social_security_employee - item.income_tax
                    - item.loan - item.advance - item.other_deductions
            );
            prop_assert!(item.social_security_employee
                <= rules.round(rules.social_security.max_contribution_base * rules.social_security.employee_rate));
        }

        #[test]
        fn prop_annual_bonus_never_pays_social_security(
            base_cents in 0i64..5_000_000,
            accumulated_cents in 0i64..10_000_000,
        ) {
            let history = FixedHistory {
                bases: vec![Decimal::new(base_cents, 2)],
                accumulated: Decimal::new(accumulated_cents, 2),
            };
            let item = calculate(
                &CompensationInput::empty("emp_001"),
                RunType::AnnualBonus13,
                &sample_rule_set(),
                &history,
            ).unwrap();

            prop_assert_eq!(item.social_security_employee, Decimal::ZERO);
            prop_assert!(item.is_balanced());
        }
    }
}
