//! Request types for the payroll API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PeriodInput, RunType};
use crate::payroll::LineItemAmendment;

use super::response::ApiError;

/// Request body for `POST /payroll/simulate` and `POST /payroll/runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRequest {
    /// Period label, e.g. "2025-01".
    pub period_label: String,
    /// Kind of payroll.
    pub run_type: RunType,
    /// Cutoff date; today when absent.
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
    /// Restrict the run to these departments.
    #[serde(default)]
    pub department_ids: Option<Vec<String>>,
    /// Restrict the run to these employees.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
    /// Jurisdiction; the server's default when absent.
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

impl From<PeriodRequest> for PeriodInput {
    fn from(req: PeriodRequest) -> Self {
        PeriodInput {
            period_label: req.period_label,
            run_type: req.run_type,
            cutoff_date: req.cutoff_date,
            department_ids: req.department_ids,
            employee_ids: req.employee_ids,
            jurisdiction: req.jurisdiction,
        }
    }
}

/// Request body for `approve` and `pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    /// Who performs the action.
    pub actor: String,
}

/// Request body for `void`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidRequest {
    /// Who voids the run.
    pub actor: String,
    /// Why the run is voided.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for `PATCH /payroll/runs/{id}/items/{employee_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmendLineItemRequest {
    /// Who makes the correction.
    pub actor: String,
    /// New loan installment.
    #[serde(default)]
    pub loan: Option<Decimal>,
    /// New advance recovery.
    #[serde(default)]
    pub advance: Option<Decimal>,
    /// New other deductions.
    #[serde(default)]
    pub other_deductions: Option<Decimal>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl AmendLineItemRequest {
    /// Splits the request into its actor and amendment.
    pub fn into_parts(self) -> (String, LineItemAmendment) {
        (
            self.actor,
            LineItemAmendment {
                loan: self.loan,
                advance: self.advance,
                other_deductions: self.other_deductions,
                notes: self.notes,
            },
        )
    }
}

/// Rejects a blank actor.
pub fn require_actor(actor: &str) -> Result<&str, ApiError> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(ApiError::with_details(
            "VALIDATION_ERROR",
            "actor must not be empty",
            "Lifecycle and amendment requests must name who performs them",
        ));
    }
    Ok(actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_request_defaults() {
        let json = r#"{"period_label": "2025-01", "run_type": "ORDINARY"}"#;
        let req: PeriodRequest = serde_json::from_str(json).unwrap();
        let input: PeriodInput = req.into();

        assert_eq!(input.run_type, RunType::Ordinary);
        assert!(input.cutoff_date.is_none());
        assert!(input.employee_ids.is_none());
    }

    #[test]
    fn test_amend_request_into_parts() {
        let json = r#"{"actor": "rrhh", "loan": "150.00"}"#;
        let req: AmendLineItemRequest = serde_json::from_str(json).unwrap();
        let (actor, amendment) = req.into_parts();

        assert_eq!(actor, "rrhh");
        assert_eq!(amendment.loan, Some(Decimal::new(15000, 2)));
        assert!(amendment.advance.is_none());
    }

    #[test]
    fn test_blank_actor_is_rejected() {
        assert!(require_actor("  ").is_err());
        assert_eq!(require_actor(" gerencia ").unwrap(), "gerencia");
    }
}
