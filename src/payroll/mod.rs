//! Payroll run processing.
//!
//! This module aggregates per-employee calculations into runs, drives the
//! run lifecycle (draft, approved, paid, voided), and records amendments of
//! draft line items.

mod aggregator;
mod audit_recorder;
mod cancel;
mod clock;
mod engine;
pub mod state_machine;

pub use aggregator::{aggregate_run, refresh_totals, select_eligible};
pub use audit_recorder::{
    AuditValue, AuditedField, LINE_ITEM_FIELDS, LineItemAmendment, diff_line_items,
};
pub use cancel::CancellationToken;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{PayrollEngine, Repositories};
pub use state_machine::VOID_REASON_PLACEHOLDER;
