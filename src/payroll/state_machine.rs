//! Payroll run lifecycle.
//!
//! ```text
//! BORRADOR ──approve──▶ APROBADA ──pay──▶ PAGADA
//!     │                     │
//!     └───────void──────────┴──────▶ ANULADA
//! ```
//!
//! Transitions are pure: they take a snapshot and return the next one with
//! its version bumped, leaving the input untouched. Persisting the new
//! snapshot is the caller's job.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollRun, RunState};

/// Reason recorded when a run is voided without one.
pub const VOID_REASON_PLACEHOLDER: &str = "Sin motivo especificado";

/// Approves a draft run.
pub fn approve(run: &PayrollRun, actor: &str, at: DateTime<Utc>) -> EngineResult<PayrollRun> {
    require(run, &[RunState::Draft], "approve")?;

    let mut next = next_snapshot(run, RunState::Approved);
    next.approved_at = Some(at);
    next.approved_by = Some(actor.to_string());
    Ok(next)
}

/// Marks an approved run as paid.
pub fn mark_paid(run: &PayrollRun, actor: &str, at: DateTime<Utc>) -> EngineResult<PayrollRun> {
    require(run, &[RunState::Approved], "pay")?;

    let mut next = next_snapshot(run, RunState::Paid);
    next.paid_at = Some(at);
    next.paid_by = Some(actor.to_string());
    Ok(next)
}

/// Voids a draft or approved run.
///
/// A missing or blank reason is replaced by [`VOID_REASON_PLACEHOLDER`].
pub fn void(
    run: &PayrollRun,
    actor: &str,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> EngineResult<PayrollRun> {
    require(run, &[RunState::Draft, RunState::Approved], "void")?;

    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(VOID_REASON_PLACEHOLDER);

    let mut next = next_snapshot(run, RunState::Voided);
    next.voided_at = Some(at);
    next.voided_by = Some(actor.to_string());
    next.void_reason = Some(reason.to_string());
    Ok(next)
}

/// Fails with `RunNotEditable` unless the run is a draft.
pub fn ensure_editable(run: &PayrollRun) -> EngineResult<()> {
    if run.state != RunState::Draft {
        return Err(EngineError::RunNotEditable {
            run_id: run.id,
            state: run.state.to_string(),
        });
    }
    Ok(())
}

fn require(run: &PayrollRun, allowed: &[RunState], action: &str) -> EngineResult<()> {
    if allowed.contains(&run.state) {
        Ok(())
    } else {
        Err(EngineError::InvalidStateTransition {
            run_id: run.id,
            state: run.state.to_string(),
            action: action.to_string(),
        })
    }
}

fn next_snapshot(run: &PayrollRun, state: RunState) -> PayrollRun {
    let mut next = run.clone();
    next.state = state;
    next.version += 1;
    next
}
