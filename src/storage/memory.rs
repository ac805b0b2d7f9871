//! In-memory implementation of every repository contract.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::{PayHistory, in_trailing_year};
use crate::config::Roster;
use crate::error::{EngineError, EngineResult};
use crate::models::{CompensationInput, Employee, FieldChange, PayrollRun, RunType};

use super::{AuditSink, CompensationRepository, EmployeeRepository, PayrollRunRepository};

/// A store keeping employees, compensation inputs, runs and audit records in
/// `RwLock`-guarded maps.
///
/// Only approved and paid runs count as pay history.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    employees: RwLock<BTreeMap<String, Employee>>,
    compensation: RwLock<Vec<CompensationInput>>,
    runs: RwLock<HashMap<Uuid, PayrollRun>>,
    audit_log: RwLock<Vec<FieldChange>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a roster.
    pub fn from_roster(roster: Roster) -> Self {
        let store = Self::new();
        if let Ok(mut employees) = store.employees.write() {
            for employee in roster.employees {
                employees.insert(employee.id.clone(), employee);
            }
        }
        if let Ok(mut compensation) = store.compensation.write() {
            *compensation = roster.compensation;
        }
        store
    }

    /// Adds or replaces an employee.
    pub fn upsert_employee(&self, employee: Employee) -> EngineResult<()> {
        write(&self.employees)?.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Adds or replaces a compensation input for its employee and period.
    pub fn upsert_compensation(&self, input: CompensationInput) -> EngineResult<()> {
        let mut inputs = write(&self.compensation)?;
        inputs.retain(|existing| {
            existing.employee_id != input.employee_id || existing.period_label != input.period_label
        });
        inputs.push(input);
        Ok(())
    }

    /// Every change recorded so far, oldest first.
    pub fn audit_log(&self) -> EngineResult<Vec<FieldChange>> {
        Ok(read(&self.audit_log)?.clone())
    }

    /// Closed runs, sorted by cutoff date.
    fn history_runs(&self) -> EngineResult<Vec<PayrollRun>> {
        let mut runs: Vec<PayrollRun> = read(&self.runs)?
            .values()
            .filter(|run| run.state.is_closed())
            .cloned()
            .collect();
        runs.sort_by_key(|run| run.cutoff_date);
        Ok(runs)
    }
}

fn poisoned() -> EngineError {
    EngineError::Storage {
        message: "in-memory store lock poisoned".to_string(),
    }
}

fn read<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| poisoned())
}

impl EmployeeRepository for InMemoryStore {
    fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(read(&self.employees)?.values().cloned().collect())
    }
}

impl CompensationRepository for InMemoryStore {
    fn compensation_for(
        &self,
        employee_id: &str,
        period_label: &str,
    ) -> EngineResult<Option<CompensationInput>> {
        let inputs = read(&self.compensation)?;
        let mut recurring = None;
        for input in inputs.iter().filter(|i| i.employee_id == employee_id) {
            match input.period_label.as_deref() {
                Some(label) if label == period_label => return Ok(Some(input.clone())),
                None => recurring = Some(input.clone()),
                Some(_) => {}
            }
        }
        Ok(recurring)
    }
}

impl PayHistory for InMemoryStore {
    fn trailing_ordinary_bases(
        &self,
        employee_id: &str,
        cutoff: NaiveDate,
    ) -> EngineResult<Vec<Decimal>> {
        Ok(self
            .history_runs()?
            .iter()
            .filter(|run| run.run_type == RunType::Ordinary)
            .filter(|run| in_trailing_year(run.cutoff_date, cutoff))
            .flat_map(|run| run.line_items().iter())
            .filter(|item| item.employee_id == employee_id)
            .map(|item| item.base_salary)
            .collect())
    }

    fn accumulated_annual_bonus(
        &self,
        employee_id: &str,
        run_type: RunType,
        year: i32,
    ) -> EngineResult<Decimal> {
        Ok(self
            .history_runs()?
            .iter()
            .filter(|run| run.run_type == run_type && run.cutoff_date.year() == year)
            .flat_map(|run| run.line_items().iter())
            .filter(|item| item.employee_id == employee_id)
            .map(|item| item.gross)
            .sum())
    }
}

impl PayrollRunRepository for InMemoryStore {
    fn get_run(&self, run_id: Uuid) -> EngineResult<Option<PayrollRun>> {
        Ok(read(&self.runs)?.get(&run_id).cloned())
    }

    fn find_runs(&self, period_label: &str, run_type: RunType) -> EngineResult<Vec<PayrollRun>> {
        let mut runs: Vec<PayrollRun> = read(&self.runs)?
            .values()
            .filter(|run| run.period_label == period_label && run.run_type == run_type)
            .cloned()
            .collect();
        runs.sort_by_key(|run| run.created_at);
        Ok(runs)
    }

    fn save_run(&self, run: &PayrollRun) -> EngineResult<()> {
        let mut runs = write(&self.runs)?;
        let stored_version = runs.get(&run.id).map(|stored| stored.version);
        let expected = run.version.saturating_sub(1);

        let accepted = match stored_version {
            None => run.version == 1,
            Some(version) => version == expected,
        };
        if !accepted {
            return Err(EngineError::ConcurrentModification {
                run_id: run.id,
                expected_version: expected,
            });
        }

        runs.insert(run.id, run.clone());
        Ok(())
    }
}

impl AuditSink for InMemoryStore {
    fn record(&self, changes: &[FieldChange]) -> EngineResult<()> {
        write(&self.audit_log)?.extend_from_slice(changes);
        Ok(())
    }
}
