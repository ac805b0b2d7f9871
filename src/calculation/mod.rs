//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: monetary rounding,
//! legal rule set resolution and validation, the progressive income-tax
//! resolver, and the per-employee pipeline (base determination, bonus
//! assembly, IGSS contributions, ISR withholding and net pay), plus the
//! employer-side contributions of a run.

mod base_salary;
mod bonuses;
mod employee_calculator;
mod employer_contributions;
mod history;
mod income_tax;
mod progressive_tax;
mod rounding;
mod rule_resolution;
mod social_security;

#[cfg(test)]
pub(crate) mod test_support;

pub use base_salary::{BaseSalaryResult, determine_base_salary};
pub use bonuses::{BonusAssembly, assemble_bonuses};
pub use employee_calculator::calculate_employee;
pub use employer_contributions::calculate_employer_contributions;
pub use history::{NoHistory, PayHistory, in_trailing_year, trailing_year};
pub use income_tax::{IncomeTaxResult, calculate_income_tax};
pub use progressive_tax::{compute_tax, find_bracket, marginal_rate, validate_bracket_table};
pub use rounding::round_amount;
pub use rule_resolution::{ensure_unambiguous, resolve_rules, validate_rule_set};
pub use social_security::{
    SocialSecurityResult, calculate_employee_social_security, capped_contribution_base,
    employer_social_security,
};
