//! Response types for the payroll API.
//!
//! This module defines the error response structures and maps engine errors
//! onto HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A `400 Bad Request` with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// HTTP status for an error category.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::RuleResolution | ErrorKind::Eligibility => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::State => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => "CONFIG_ERROR",
        EngineError::InvalidCompensationInput { .. } => "INVALID_COMPENSATION_INPUT",
        EngineError::InvalidBracketTable { .. } => "INVALID_BRACKET_TABLE",
        EngineError::InvalidRuleSet { .. } => "INVALID_RULE_SET",
        EngineError::InvalidPeriodInput { .. } => "INVALID_PERIOD_INPUT",
        EngineError::NoApplicableRuleSet { .. } => "NO_APPLICABLE_RULE_SET",
        EngineError::AmbiguousRuleSet { .. } => "AMBIGUOUS_RULE_SET",
        EngineError::NoEligibleEmployees { .. } => "NO_ELIGIBLE_EMPLOYEES",
        EngineError::DuplicatePeriodClosed { .. } => "DUPLICATE_PERIOD_CLOSED",
        EngineError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
        EngineError::RunNotEditable { .. } => "RUN_NOT_EDITABLE",
        EngineError::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
        EngineError::RunNotFound { .. } => "RUN_NOT_FOUND",
        EngineError::LineItemNotFound { .. } => "LINE_ITEM_NOT_FOUND",
        EngineError::Cancelled { .. } => "CANCELLED",
        EngineError::Storage { .. } => "STORAGE_ERROR",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = status_for(error.kind());
        let code = error_code(&error);

        let error = match &error {
            EngineError::InvalidCompensationInput {
                employee_id, field, ..
            } => ApiError::with_details(
                code,
                error.to_string(),
                format!("employee_id={}, field={}", employee_id, field),
            ),
            EngineError::InvalidPeriodInput { field, .. } => {
                ApiError::with_details(code, error.to_string(), format!("field={}", field))
            }
            EngineError::DuplicatePeriodClosed { run_id, .. } => ApiError::with_details(
                code,
                error.to_string(),
                format!("Void run {} before processing the period again", run_id),
            ),
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::Storage { .. } => {
                ApiError::with_details(code, "Internal server error", error.to_string())
            }
            _ => ApiError::new(code, error.to_string()),
        };

        ApiErrorResponse { status, error }
    }
}
