//! Repository contracts consumed by the payroll engine.
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync` so a single store can be shared by
//! the engine and the axum application state.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::calculation::PayHistory;
use crate::config::{ConfigLoader, LegalRuleSet};
use crate::error::EngineResult;
use crate::models::{CompensationInput, Employee, FieldChange, PayrollRun, RunType};

/// Employee master data.
pub trait EmployeeRepository: Send + Sync {
    /// All employees, in any status, ordered by id.
    fn list_employees(&self) -> EngineResult<Vec<Employee>>;
}

/// Per-period and recurring compensation inputs.
pub trait CompensationRepository: Send + Sync {
    /// The input that applies to `employee_id` in `period_label`.
    ///
    /// An input recorded for that exact period wins over a recurring one.
    /// Returns `None` when the employee has neither.
    fn compensation_for(
        &self,
        employee_id: &str,
        period_label: &str,
    ) -> EngineResult<Option<CompensationInput>>;
}

/// Legal rule sets keyed by jurisdiction and date.
pub trait RuleSetRepository: Send + Sync {
    /// The rule set in force for `jurisdiction` on `date`.
    ///
    /// Returns `Err(EngineError::NoApplicableRuleSet)` when none applies.
    fn resolve(&self, jurisdiction: &str, date: NaiveDate) -> EngineResult<LegalRuleSet>;
}

/// Persisted payroll runs, which also serve as the pay history.
///
/// ## Version Check
///
/// `save_run` is a compare-and-swap: a run with `version == 1` must not
/// exist yet, and any later version must replace a stored snapshot whose
/// version is exactly one less. Otherwise the save fails with
/// `Err(EngineError::ConcurrentModification)` and nothing is written.
pub trait PayrollRunRepository: PayHistory {
    /// Looks a run up by id.
    fn get_run(&self, run_id: Uuid) -> EngineResult<Option<PayrollRun>>;

    /// Every run of one period label and type, in any state.
    fn find_runs(&self, period_label: &str, run_type: RunType) -> EngineResult<Vec<PayrollRun>>;

    /// Stores a run snapshot with the version check described above.
    fn save_run(&self, run: &PayrollRun) -> EngineResult<()>;
}

/// Destination for line-item change records.
pub trait AuditSink: Send + Sync {
    /// Records a batch of field changes.
    fn record(&self, changes: &[FieldChange]) -> EngineResult<()>;
}

impl RuleSetRepository for ConfigLoader {
    fn resolve(&self, jurisdiction: &str, date: NaiveDate) -> EngineResult<LegalRuleSet> {
        ConfigLoader::resolve(self, jurisdiction, date)
    }
}
