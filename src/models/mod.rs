//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod compensation;
mod employee;
mod line_item;
mod payroll_run;

pub use audit::{AuditStep, AuditWarning, FieldChange};
pub(crate) use compensation::check_amount;
pub use compensation::{CompensationInput, HourOverrides, RecurringDeductions, max_amount, max_hours};
pub use employee::{Employee, EmploymentStatus};
pub use line_item::PayrollLineItem;
pub use payroll_run::{
    EmployerContributionSummary, PayrollRun, PayrollRunPreview, PeriodInput, RunCalculation,
    RunState, RunTotals, RunType, StatutoryProvisions,
};
