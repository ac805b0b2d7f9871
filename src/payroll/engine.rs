//! The payroll engine facade.
//!
//! [`PayrollEngine`] loads inputs through the repository traits, calls the
//! pure aggregator and state machine, and persists the resulting snapshots.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::PayHistory;
use crate::config::{ConfigLoader, LegalRuleSet};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CompensationInput, Employee, PayrollRun, PayrollRunPreview, PeriodInput,
    RunCalculation, RunState, RunType,
};
use crate::storage::{
    AuditSink, CompensationRepository, EmployeeRepository, InMemoryStore, PayrollRunRepository,
    RuleSetRepository,
};

use super::aggregator::{aggregate_run, refresh_totals, select_eligible};
use super::audit_recorder::{LineItemAmendment, diff_line_items};
use super::cancel::CancellationToken;
use super::clock::{Clock, SystemClock};
use super::state_machine;

/// The collaborators the engine reads from and writes to.
#[derive(Clone)]
pub struct Repositories {
    /// Employee master data.
    pub employees: Arc<dyn EmployeeRepository>,
    /// Compensation inputs.
    pub compensation: Arc<dyn CompensationRepository>,
    /// Legal rule sets.
    pub rule_sets: Arc<dyn RuleSetRepository>,
    /// Payroll runs and pay history.
    pub runs: Arc<dyn PayrollRunRepository>,
    /// Change-record destination.
    pub audit: Arc<dyn AuditSink>,
}

impl Repositories {
    /// Uses `store` for everything except rule sets, which come from `loader`.
    pub fn in_memory(loader: ConfigLoader, store: Arc<InMemoryStore>) -> Self {
        Self {
            employees: store.clone(),
            compensation: store.clone(),
            rule_sets: Arc::new(loader),
            runs: store.clone(),
            audit: store,
        }
    }
}

type RunKey = (String, RunType);

/// Calculates, persists and moves payroll runs through their lifecycle.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use nomina_engine::config::ConfigLoader;
/// use nomina_engine::models::{PeriodInput, RunType};
/// use nomina_engine::payroll::{PayrollEngine, Repositories};
/// use nomina_engine::storage::InMemoryStore;
///
/// let loader = ConfigLoader::load("./config/gt").unwrap();
/// let roster = ConfigLoader::load_roster("./config/gt/roster.yaml").unwrap();
/// let store = Arc::new(InMemoryStore::from_roster(roster));
/// let engine = PayrollEngine::new(Repositories::in_memory(loader, store), "GT");
///
/// let run = engine.process(&PeriodInput::new("2025-01", RunType::Ordinary)).unwrap();
/// let run = engine.approve(run.id, "gerencia@empresa.gt").unwrap();
/// println!("{} {}", run.id, run.state);
/// ```
pub struct PayrollEngine {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    jurisdiction: String,
    utc_offset: FixedOffset,
    run_locks: Mutex<HashMap<RunKey, Arc<Mutex<()>>>>,
}

/// Inputs loaded for one calculation.
struct PreparedRun {
    jurisdiction: String,
    cutoff: NaiveDate,
    rules: LegalRuleSet,
    entries: Vec<(Employee, CompensationInput)>,
}

impl PayrollEngine {
    /// Creates an engine using the system clock.
    pub fn new(repos: Repositories, jurisdiction: impl Into<String>) -> Self {
        Self {
            repos,
            clock: Arc::new(SystemClock),
            jurisdiction: jurisdiction.into(),
            utc_offset: Utc.fix(),
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the offset used to turn the clock's instant into the default
    /// cutoff date. UTC unless set.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// The jurisdiction used when a period input names none.
    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Calculates a run without persisting it or checking for existing runs.
    pub fn simulate(&self, input: &PeriodInput) -> EngineResult<PayrollRunPreview> {
        input.validate()?;
        let prepared = self.prepare(input)?;
        let calculation = self.calculate(&prepared, input.run_type)?;

        info!(
            period = %input.period_label,
            run_type = %input.run_type,
            employees = calculation.employee_count,
            gross = %calculation.totals.gross,
            "Payroll simulated"
        );

        Ok(PayrollRunPreview {
            period_label: input.period_label.clone(),
            run_type: input.run_type,
            jurisdiction: prepared.jurisdiction,
            cutoff_date: prepared.cutoff,
            calculation,
        })
    }

    /// Calculates and persists a draft run.
    pub fn process(&self, input: &PeriodInput) -> EngineResult<PayrollRun> {
        self.process_with_cancel(input, &CancellationToken::new())
    }

    /// [`process`](Self::process) with a cancellation token.
    ///
    /// An existing draft for the same period and type is recalculated in
    /// place (same id, next version). An approved or paid run for them fails
    /// with `DuplicatePeriodClosed`; voided runs are ignored.
    pub fn process_with_cancel(
        &self,
        input: &PeriodInput,
        cancel: &CancellationToken,
    ) -> EngineResult<PayrollRun> {
        input.validate()?;
        let lock = self.run_lock(&input.period_label, input.run_type)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;

        let prepared = self.prepare(input)?;

        let existing = self
            .repos
            .runs
            .find_runs(&input.period_label, input.run_type)?;
        if let Some(closed) = existing.iter().find(|run| run.state.is_closed()) {
            warn!(
                run_id = %closed.id,
                period = %closed.period_label,
                state = %closed.state,
                "Period already closed"
            );
            return Err(EngineError::DuplicatePeriodClosed {
                run_id: closed.id,
                period_label: closed.period_label.clone(),
                run_type: closed.run_type.to_string(),
            });
        }
        let draft = existing
            .into_iter()
            .filter(|run| run.state == RunState::Draft)
            .max_by_key(|run| run.created_at);

        cancel.check("before calculation")?;
        let calculation = self.calculate(&prepared, input.run_type)?;
        cancel.check("before persisting")?;

        let now = self.clock.now();
        let run = match draft {
            Some(draft) => replace_calculation(draft, input, prepared, calculation, now),
            None => {
                let preview = PayrollRunPreview {
                    period_label: input.period_label.clone(),
                    run_type: input.run_type,
                    jurisdiction: prepared.jurisdiction,
                    cutoff_date: prepared.cutoff,
                    calculation,
                };
                PayrollRun::new_draft(preview, input, now)
            }
        };
        self.repos.runs.save_run(&run)?;

        info!(
            run_id = %run.id,
            version = run.version,
            period = %run.period_label,
            run_type = %run.run_type,
            employees = run.calculation.employee_count,
            gross = %run.calculation.totals.gross,
            net = %run.calculation.totals.net,
            "Payroll run processed"
        );
        Ok(run)
    }

    /// Recalculates a draft run with the parameters it was created with.
    pub fn recalculate(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        self.recalculate_with_cancel(run_id, &CancellationToken::new())
    }

    /// [`recalculate`](Self::recalculate) with a cancellation token.
    pub fn recalculate_with_cancel(
        &self,
        run_id: Uuid,
        cancel: &CancellationToken,
    ) -> EngineResult<PayrollRun> {
        let run = self.get_run(run_id)?;
        state_machine::ensure_editable(&run)?;

        let lock = self.run_lock(&run.period_label, run.run_type)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;

        // Re-read under the lock; the run may have moved on meanwhile.
        let run = self.get_run(run_id)?;
        state_machine::ensure_editable(&run)?;

        let input = run.period_input();
        let prepared = self.prepare(&input)?;
        cancel.check("before calculation")?;
        let calculation = self.calculate(&prepared, input.run_type)?;
        cancel.check("before persisting")?;

        let run = replace_calculation(run, &input, prepared, calculation, self.clock.now());
        self.repos.runs.save_run(&run)?;

        info!(
            run_id = %run.id,
            version = run.version,
            gross = %run.calculation.totals.gross,
            "Payroll run recalculated"
        );
        Ok(run)
    }

    /// Approves a draft run.
    pub fn approve(&self, run_id: Uuid, actor: &str) -> EngineResult<PayrollRun> {
        let now = self.clock.now();
        self.transition(run_id, "approve", |run| state_machine::approve(run, actor, now))
    }

    /// Marks an approved run as paid.
    pub fn mark_paid(&self, run_id: Uuid, actor: &str) -> EngineResult<PayrollRun> {
        let now = self.clock.now();
        self.transition(run_id, "pay", |run| state_machine::mark_paid(run, actor, now))
    }

    /// Voids a draft or approved run.
    pub fn void(&self, run_id: Uuid, actor: &str, reason: Option<&str>) -> EngineResult<PayrollRun> {
        let now = self.clock.now();
        self.transition(run_id, "void", |run| state_machine::void(run, actor, reason, now))
    }

    /// Corrects the deductions or notes of one line item of a draft run.
    ///
    /// Amounts are checked against the precision of the run's rule set.
    /// Derived amounts and run totals are recomputed, every changed field is
    /// sent to the audit sink, and the run is then saved with a version
    /// check.
    pub fn amend_line_item(
        &self,
        run_id: Uuid,
        employee_id: &str,
        amendment: &LineItemAmendment,
        actor: &str,
    ) -> EngineResult<PayrollRun> {
        if amendment.is_empty() {
            return Err(EngineError::InvalidCompensationInput {
                employee_id: employee_id.to_string(),
                field: "amendment".to_string(),
                message: "names no field to change".to_string(),
            });
        }

        let run = self.get_run(run_id)?;
        state_machine::ensure_editable(&run)?;
        let lock = self.run_lock(&run.period_label, run.run_type)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;
        let run = self.get_run(run_id)?;
        state_machine::ensure_editable(&run)?;

        let index = run
            .line_items()
            .iter()
            .position(|item| item.employee_id == employee_id)
            .ok_or_else(|| EngineError::LineItemNotFound {
                run_id,
                employee_id: employee_id.to_string(),
            })?;

        let rounding = self
            .repos
            .rule_sets
            .resolve(&run.jurisdiction, run.cutoff_date)?
            .rounding;
        let before = &run.line_items()[index];
        let mut after = amendment.apply(before, rounding.decimals)?;
        let now = self.clock.now();
        let changes = diff_line_items(run_id, before, &after, &rounding, actor, now);
        if changes.is_empty() {
            return Ok(run);
        }

        after.trace.push(AuditStep {
            step_number: after.trace.len() as u32 + 1,
            rule_id: "manual_amendment".to_string(),
            rule_name: "Manual Amendment".to_string(),
            legal_ref: "Código de Trabajo, art. 99".to_string(),
            input: serde_json::to_value(amendment).unwrap_or_default(),
            output: serde_json::json!({
                "total_deductions": after.total_deductions.to_string(),
                "net_pay": after.net_pay.to_string()
            }),
            reasoning: format!("Amended by {}: {} field(s) changed", actor, changes.len()),
        });

        let mut updated = run.clone();
        updated.calculation.line_items[index] = after;
        refresh_totals(&mut updated.calculation);
        updated.version += 1;

        // Audit first: a saved amendment always has its change records.
        self.repos.audit.record(&changes)?;
        self.repos.runs.save_run(&updated).inspect_err(|err| {
            warn!(
                run_id = %run_id,
                employee_id = %employee_id,
                error = %err,
                "Amendment audited but not saved"
            );
        })?;

        info!(
            run_id = %run_id,
            employee_id = %employee_id,
            actor = %actor,
            changes = changes.len(),
            "Line item amended"
        );
        Ok(updated)
    }

    /// Looks a run up by id.
    pub fn get_run(&self, run_id: Uuid) -> EngineResult<PayrollRun> {
        self.repos
            .runs
            .get_run(run_id)?
            .ok_or(EngineError::RunNotFound { run_id })
    }

    fn transition<F>(&self, run_id: Uuid, action: &str, apply: F) -> EngineResult<PayrollRun>
    where
        F: FnOnce(&PayrollRun) -> EngineResult<PayrollRun>,
    {
        let run = self.get_run(run_id)?;
        let lock = self.run_lock(&run.period_label, run.run_type)?;
        let _guard = lock.lock().map_err(|_| lock_poisoned())?;
        let run = self.get_run(run_id)?;
        let next = apply(&run).inspect_err(|err| {
            warn!(run_id = %run_id, action = action, error = %err, "Transition rejected");
        })?;
        self.repos.runs.save_run(&next)?;

        info!(
            run_id = %run_id,
            action = action,
            from = %run.state,
            to = %next.state,
            version = next.version,
            "Payroll run transitioned"
        );
        Ok(next)
    }

    fn prepare(&self, input: &PeriodInput) -> EngineResult<PreparedRun> {
        let jurisdiction = input
            .jurisdiction
            .clone()
            .unwrap_or_else(|| self.jurisdiction.clone());
        let cutoff = input
            .cutoff_date
            .unwrap_or_else(|| self.clock.today_in(self.utc_offset));
        let rules = self.repos.rule_sets.resolve(&jurisdiction, cutoff)?;

        let employees = select_eligible(self.repos.employees.list_employees()?, input);
        if employees.is_empty() {
            warn!(period = %input.period_label, "No eligible employees");
            return Err(EngineError::NoEligibleEmployees {
                period_label: input.period_label.clone(),
            });
        }

        let entries = employees
            .into_iter()
            .map(|employee| {
                let compensation = self
                    .repos
                    .compensation
                    .compensation_for(&employee.id, &input.period_label)?
                    .unwrap_or_else(|| CompensationInput::empty(employee.id.clone()));
                Ok((employee, compensation))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(PreparedRun {
            jurisdiction,
            cutoff,
            rules,
            entries,
        })
    }

    fn calculate(&self, prepared: &PreparedRun, run_type: RunType) -> EngineResult<RunCalculation> {
        let history = RunHistory(self.repos.runs.as_ref());
        aggregate_run(
            &prepared.entries,
            run_type,
            &prepared.rules,
            prepared.cutoff,
            &history,
        )
    }

    fn run_lock(&self, period_label: &str, run_type: RunType) -> EngineResult<Arc<Mutex<()>>> {
        let mut locks = self.run_locks.lock().map_err(|_| lock_poisoned())?;
        Ok(locks
            .entry((period_label.to_string(), run_type))
            .or_default()
            .clone())
    }
}

fn replace_calculation(
    mut run: PayrollRun,
    input: &PeriodInput,
    prepared: PreparedRun,
    calculation: RunCalculation,
    now: DateTime<Utc>,
) -> PayrollRun {
    run.jurisdiction = prepared.jurisdiction;
    run.cutoff_date = prepared.cutoff;
    run.department_ids = input.department_ids.clone();
    run.employee_ids = input.employee_ids.clone();
    run.calculation = calculation;
    run.calculated_at = now;
    run.version += 1;
    run
}

/// Pay history read from the run repository.
struct RunHistory<'a>(&'a dyn PayrollRunRepository);

impl PayHistory for RunHistory<'_> {
    fn trailing_ordinary_bases(
        &self,
        employee_id: &str,
        cutoff: NaiveDate,
    ) -> EngineResult<Vec<Decimal>> {
        self.0.trailing_ordinary_bases(employee_id, cutoff)
    }

    fn accumulated_annual_bonus(
        &self,
        employee_id: &str,
        run_type: RunType,
        year: i32,
    ) -> EngineResult<Decimal> {
        self.0.accumulated_annual_bonus(employee_id, run_type, year)
    }
}

fn lock_poisoned() -> EngineError {
    EngineError::Storage {
        message: "run lock poisoned".to_string(),
    }
}
