//! Run aggregation.
//!
//! Pure functions that pick the employees of a run and turn their inputs
//! into a [`RunCalculation`]. Loading and persistence live in the engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculation::{PayHistory, calculate_employee, calculate_employer_contributions};
use crate::config::LegalRuleSet;
use crate::error::EngineResult;
use crate::models::{
    AuditWarning, CompensationInput, Employee, PayrollLineItem, PeriodInput, RunCalculation,
    RunTotals, RunType,
};

/// Keeps active employees matching the input's filters, ordered by id.
///
/// When both a department filter and an employee filter are given, an
/// employee must match both.
pub fn select_eligible(employees: Vec<Employee>, input: &PeriodInput) -> Vec<Employee> {
    let mut eligible: Vec<Employee> = employees
        .into_iter()
        .filter(Employee::is_active)
        .filter(|e| {
            input.department_ids.as_ref().is_none_or(|ids| {
                e.department_id
                    .as_ref()
                    .is_some_and(|dept| ids.contains(dept))
            })
        })
        .filter(|e| {
            input
                .employee_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&e.id))
        })
        .collect();
    eligible.sort_by(|a, b| a.id.cmp(&b.id));
    eligible
}

/// Calculates every employee and sums the run.
///
/// The first failing employee aborts the whole calculation.
pub fn aggregate_run(
    entries: &[(Employee, CompensationInput)],
    run_type: RunType,
    rules: &LegalRuleSet,
    cutoff: NaiveDate,
    history: &dyn PayHistory,
) -> EngineResult<RunCalculation> {
    let line_items = entries
        .iter()
        .map(|(employee, input)| {
            calculate_employee(employee, input, run_type, rules, cutoff, history)
        })
        .collect::<EngineResult<Vec<PayrollLineItem>>>()?;

    let warnings = line_item_warnings(&line_items, run_type);
    let employer_contributions = calculate_employer_contributions(&line_items, run_type, rules);

    Ok(RunCalculation {
        rule_set_effective_from: rules.effective_from,
        totals: RunTotals::from_line_items(&line_items),
        employee_count: line_items.len(),
        line_items,
        employer_contributions,
        warnings,
    })
}

/// Recomputes the run-level sums after line items changed.
pub fn refresh_totals(calculation: &mut RunCalculation) {
    calculation.totals = RunTotals::from_line_items(&calculation.line_items);
    calculation.employee_count = calculation.line_items.len();
}

fn line_item_warnings(items: &[PayrollLineItem], run_type: RunType) -> Vec<AuditWarning> {
    let mut warnings = Vec::new();
    for item in items {
        if item.net_pay < Decimal::ZERO {
            warnings.push(AuditWarning::new(
                "NEGATIVE_NET_PAY",
                format!(
                    "Deductions of Q{} exceed gross Q{} for employee {}",
                    item.total_deductions, item.gross, item.employee_id
                ),
                "high",
            ));
        }
        if run_type.is_annual_bonus() && item.base_salary.is_zero() {
            warnings.push(AuditWarning::new(
                "NO_SALARY_HISTORY",
                format!(
                    "Employee {} has no ordinary runs in the trailing twelve months",
                    item.employee_id
                ),
                "medium",
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::NoHistory;
    use crate::calculation::test_support::{date, dec, sample_employee, sample_rule_set};
    use crate::error::EngineError;
    use crate::models::EmploymentStatus;

    fn roster() -> Vec<Employee> {
        let mut ops = sample_employee("emp_003", "3800.00");
        ops.department_id = Some("operaciones".to_string());
        let mut terminated = sample_employee("emp_004", "5000.00");
        terminated.status = EmploymentStatus::Terminated;
        vec![
            ops,
            sample_employee("emp_002", "4200.00"),
            terminated,
            sample_employee("emp_001", "6000.00"),
        ]
    }

    fn ids(employees: &[Employee]) -> Vec<&str> {
        employees.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_select_active_sorted() {
        let input = PeriodInput::new("2025-01", RunType::Ordinary);
        let eligible = select_eligible(roster(), &input);
        assert_eq!(ids(&eligible), vec!["emp_001", "emp_002", "emp_003"]);
    }

    #[test]
    fn test_department_filter() {
        let mut input = PeriodInput::new("2025-01", RunType::Ordinary);
        input.department_ids = Some(vec!["operaciones".to_string()]);
        assert_eq!(ids(&select_eligible(roster(), &input)), vec!["emp_003"]);
    }

    #[test]
    fn test_filters_intersect() {
        let mut input = PeriodInput::new("2025-01", RunType::Ordinary);
        input.department_ids = Some(vec!["finanzas".to_string()]);
        input.employee_ids = Some(vec!["emp_002".to_string(), "emp_003".to_string()]);
        assert_eq!(ids(&select_eligible(roster(), &input)), vec!["emp_002"]);
    }

    #[test]
    fn test_terminated_employee_is_never_selected() {
        let mut input = PeriodInput::new("2025-01", RunType::Ordinary);
        input.employee_ids = Some(vec!["emp_004".to_string()]);
        assert!(select_eligible(roster(), &input).is_empty());
    }

    #[test]
    fn test_aggregate_sums_line_items() {
        let entries = vec![
            (sample_employee("emp_001", "6000.00"), CompensationInput::empty("emp_001")),
            (sample_employee("emp_002", "4000.00"), CompensationInput::empty("emp_002")),
        ];

        let calc = aggregate_run(&entries, RunType::Ordinary, &sample_rule_set(), date(2025, 1, 31), &NoHistory)
            .unwrap();

        assert_eq!(calc.employee_count, 2);
        assert_eq!(calc.totals.gross, dec("10500.00"));
        assert_eq!(calc.totals.bonuses, dec("500.00"));
        assert_eq!(
            calc.totals.net,
            calc.line_items.iter().map(|i| i.net_pay).sum::<Decimal>()
        );
        assert_eq!(calc.rule_set_effective_from, date(2024, 1, 1));
        assert!(calc.employer_contributions.provisions.is_some());
        assert!(calc.warnings.is_empty());
    }

    #[test]
    fn test_one_invalid_employee_aborts_the_run() {
        let mut bad = CompensationInput::empty("emp_002");
        bad.commission = dec("-1");
        let entries = vec![
            (sample_employee("emp_001", "6000.00"), CompensationInput::empty("emp_001")),
            (sample_employee("emp_002", "4000.00"), bad),
        ];

        match aggregate_run(&entries, RunType::Ordinary, &sample_rule_set(), date(2025, 1, 31), &NoHistory) {
            Err(EngineError::InvalidCompensationInput { employee_id, .. }) => {
                assert_eq!(employee_id, "emp_002");
            }
            other => panic!("Expected InvalidCompensationInput, got {:?}", other),
        }
    }

    #[test]
    fn test_warnings_for_negative_net_and_missing_history() {
        let mut heavy = CompensationInput::empty("emp_001");
        heavy.deductions.loan = dec("9000.00");
        let entries = vec![(sample_employee("emp_001", "6000.00"), heavy)];

        let ordinary = aggregate_run(&entries, RunType::Ordinary, &sample_rule_set(), date(2025, 1, 31), &NoHistory)
            .unwrap();
        assert_eq!(ordinary.warnings[0].code, "NEGATIVE_NET_PAY");

        let entries = vec![(sample_employee("emp_001", "6000.00"), CompensationInput::empty("emp_001"))];
        let bonus = aggregate_run(&entries, RunType::AnnualBonus13, &sample_rule_set(), date(2025, 12, 15), &NoHistory)
            .unwrap();
        assert_eq!(bonus.warnings[0].code, "NO_SALARY_HISTORY");
    }

    #[test]
    fn test_refresh_totals_after_edit() {
        let entries = vec![(sample_employee("emp_001", "6000.00"), CompensationInput::empty("emp_001"))];
        let mut calc = aggregate_run(&entries, RunType::Ordinary, &sample_rule_set(), date(2025, 1, 31), &NoHistory)
            .unwrap();

        calc.line_items[0].loan = dec("100.00");
        calc.line_items[0].rebalance();
        refresh_totals(&mut calc);

        assert_eq!(calc.totals.net, calc.line_items[0].net_pay);
    }
}
