//! Persistence boundaries of the payroll engine.
//!
//! The engine reads employees, compensation inputs, rule sets and pay
//! history through the traits in this module and writes runs and change
//! records back through them. [`InMemoryStore`] implements every trait
//! except [`RuleSetRepository`], which [`crate::config::ConfigLoader`]
//! implements.

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::{
    AuditSink, CompensationRepository, EmployeeRepository, PayrollRunRepository,
    RuleSetRepository,
};
