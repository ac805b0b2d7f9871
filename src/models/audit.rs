//! Calculation trace and change-audit records.
//!
//! [`AuditStep`] records each rule applied while computing a line item.
//! [`FieldChange`] records a manual amendment of a persisted line item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step in a line item's calculation trace.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legal provision behind this rule.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during configuration or calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// One changed field of an amended payroll line item.
///
/// # Example
///
/// ```
/// use nomina_engine::models::FieldChange;
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let change = FieldChange {
///     run_id: Uuid::new_v4(),
///     employee_id: "emp_001".to_string(),
///     field: "loan".to_string(),
///     old_value: "200.00".to_string(),
///     new_value: "150.00".to_string(),
///     actor: "rrhh@empresa.gt".to_string(),
///     changed_at: Utc::now(),
/// };
/// assert_eq!(change.field, "loan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Run owning the amended line item.
    pub run_id: Uuid,
    /// Employee of the amended line item.
    pub employee_id: String,
    /// Name of the changed field.
    pub field: String,
    /// Value before the change, in canonical text form.
    pub old_value: String,
    /// Value after the change, in canonical text form.
    pub new_value: String,
    /// Who made the change.
    pub actor: String,
    /// When the change was made.
    pub changed_at: DateTime<Utc>,
}
