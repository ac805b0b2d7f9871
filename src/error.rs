//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while resolving rule sets,
//! calculating line items and moving payroll runs through their lifecycle.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// The broad category an [`EngineError`] belongs to.
///
/// Callers use the kind to decide how to report a failure (for example which
/// HTTP status to answer with) without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any calculation.
    Validation,
    /// No usable legal rule set for the requested date.
    RuleResolution,
    /// The employee filters selected nobody.
    Eligibility,
    /// Illegal lifecycle operation on a payroll run.
    State,
    /// A referenced run or line item does not exist.
    NotFound,
    /// Configuration files are missing or unreadable.
    Configuration,
    /// The caller cancelled the operation.
    Cancelled,
    /// The persistence backend failed.
    Storage,
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use nomina_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::NoEligibleEmployees {
///     period_label: "2025-01".to_string(),
/// };
/// assert_eq!(error.kind(), ErrorKind::Eligibility);
/// assert_eq!(error.to_string(), "No eligible employees for period 2025-01");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A compensation input contained a value the calculator cannot accept.
    #[error("Invalid compensation input for employee '{employee_id}', field '{field}': {message}")]
    InvalidCompensationInput {
        /// The employee whose input was rejected.
        employee_id: String,
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A tax bracket table is malformed.
    #[error("Invalid bracket table: {message}")]
    InvalidBracketTable {
        /// A description of the defect.
        message: String,
    },

    /// A legal rule set failed validation.
    #[error("Invalid rule set for '{jurisdiction}' effective {effective_from}: {message}")]
    InvalidRuleSet {
        /// Jurisdiction of the rule set.
        jurisdiction: String,
        /// Start date of the rule set.
        effective_from: NaiveDate,
        /// A description of the defect.
        message: String,
    },

    /// The period input of a run request is malformed.
    #[error("Invalid period input field '{field}': {message}")]
    InvalidPeriodInput {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// No active rule set covers the requested date.
    #[error("No applicable rule set for jurisdiction '{jurisdiction}' on {date}")]
    NoApplicableRuleSet {
        /// The jurisdiction requested.
        jurisdiction: String,
        /// The date requested.
        date: NaiveDate,
    },

    /// More than one active rule set starts on the same date.
    #[error("Ambiguous rule sets for jurisdiction '{jurisdiction}' effective {effective_from}")]
    AmbiguousRuleSet {
        /// The jurisdiction with duplicated rule sets.
        jurisdiction: String,
        /// The shared start date.
        effective_from: NaiveDate,
    },

    /// The employee filters selected no active employee.
    #[error("No eligible employees for period {period_label}")]
    NoEligibleEmployees {
        /// The period that was requested.
        period_label: String,
    },

    /// An approved or paid run already exists for the period and type.
    #[error("Payroll run {run_id} for period {period_label} ({run_type}) is already closed")]
    DuplicatePeriodClosed {
        /// The existing closed run.
        run_id: Uuid,
        /// Its period label.
        period_label: String,
        /// Its run type.
        run_type: String,
    },

    /// The requested lifecycle action is not allowed from the current state.
    #[error("Cannot {action} payroll run {run_id} in state {state}")]
    InvalidStateTransition {
        /// The run that was targeted.
        run_id: Uuid,
        /// Its current state.
        state: String,
        /// The action that was attempted.
        action: String,
    },

    /// The run is no longer a draft and cannot be recalculated or amended.
    #[error("Payroll run {run_id} is {state} and can no longer be edited")]
    RunNotEditable {
        /// The run that was targeted.
        run_id: Uuid,
        /// Its current state.
        state: String,
    },

    /// Another writer saved the run first.
    #[error("Payroll run {run_id} was modified concurrently (expected version {expected_version})")]
    ConcurrentModification {
        /// The run that was targeted.
        run_id: Uuid,
        /// The version the writer started from.
        expected_version: u64,
    },

    /// No run exists with the given id.
    #[error("Payroll run not found: {run_id}")]
    RunNotFound {
        /// The id that was looked up.
        run_id: Uuid,
    },

    /// The run has no line item for the given employee.
    #[error("Payroll run {run_id} has no line item for employee '{employee_id}'")]
    LineItemNotFound {
        /// The run that was searched.
        run_id: Uuid,
        /// The employee that was looked up.
        employee_id: String,
    },

    /// The operation was cancelled before it persisted anything.
    #[error("Operation cancelled: {stage}")]
    Cancelled {
        /// Where the cancellation was observed.
        stage: String,
    },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCompensationInput { .. }
            | Self::InvalidBracketTable { .. }
            | Self::InvalidRuleSet { .. }
            | Self::InvalidPeriodInput { .. } => ErrorKind::Validation,
            Self::NoApplicableRuleSet { .. } | Self::AmbiguousRuleSet { .. } => {
                ErrorKind::RuleResolution
            }
            Self::NoEligibleEmployees { .. } => ErrorKind::Eligibility,
            Self::DuplicatePeriodClosed { .. }
            | Self::InvalidStateTransition { .. }
            | Self::RunNotEditable { .. }
            | Self::ConcurrentModification { .. } => ErrorKind::State,
            Self::RunNotFound { .. } | Self::LineItemNotFound { .. } => ErrorKind::NotFound,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => {
                ErrorKind::Configuration
            }
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
