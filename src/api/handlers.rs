//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::PeriodInput;

use super::request::{ActorRequest, AmendLineItemRequest, PeriodRequest, VoidRequest, require_actor};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/simulate", post(simulate_handler))
        .route("/payroll/runs", post(process_handler))
        .route("/payroll/runs/:id", get(get_run_handler))
        .route("/payroll/runs/:id/recalculate", post(recalculate_handler))
        .route("/payroll/runs/:id/approve", post(approve_handler))
        .route("/payroll/runs/:id/pay", post(pay_handler))
        .route("/payroll/runs/:id/void", post(void_handler))
        .route("/payroll/runs/:id/items/:employee_id", patch(amend_handler))
        .with_state(state)
}

/// Handler for `POST /payroll/simulate`.
async fn simulate_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing simulation request");

    let input: PeriodInput = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let result = state.engine().simulate(&input);
    if let Ok(preview) = &result {
        info!(
            correlation_id = %correlation_id,
            period = %preview.period_label,
            employees = preview.calculation.employee_count,
            gross = %preview.calculation.totals.gross,
            duration_us = start_time.elapsed().as_micros(),
            "Simulation completed successfully"
        );
    }
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for `POST /payroll/runs`.
async fn process_handler(
    State(state): State<AppState>,
    payload: Result<Json<PeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let input: PeriodInput = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let result = state.engine().process(&input);
    if let Ok(run) = &result {
        info!(
            correlation_id = %correlation_id,
            run_id = %run.id,
            version = run.version,
            duration_us = start_time.elapsed().as_micros(),
            "Payroll run stored"
        );
    }
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for `GET /payroll/runs/{id}`.
async fn get_run_handler(
    State(state): State<AppState>,
    run_id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let run_id = match run_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection(correlation_id, rejection),
    };
    respond(correlation_id, StatusCode::OK, state.engine().get_run(run_id))
}

/// Handler for `POST /payroll/runs/{id}/recalculate`.
async fn recalculate_handler(
    State(state): State<AppState>,
    run_id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let run_id = match run_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, run_id = %run_id, "Recalculating payroll run");
    respond(correlation_id, StatusCode::OK, state.engine().recalculate(run_id))
}

/// Handler for `POST /payroll/runs/{id}/approve`.
async fn approve_handler(
    State(state): State<AppState>,
    run_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (run_id, req) = match (run_id, payload) {
        (Ok(Path(id)), Ok(Json(req))) => (id, req),
        (Err(rejection), _) => return path_rejection(correlation_id, rejection),
        (_, Err(rejection)) => return json_rejection(correlation_id, rejection),
    };
    let actor = match require_actor(&req.actor) {
        Ok(actor) => actor,
        Err(error) => return ApiErrorResponse::bad_request(error).into_response(),
    };
    respond(correlation_id, StatusCode::OK, state.engine().approve(run_id, actor))
}

/// Handler for `POST /payroll/runs/{id}/pay`.
async fn pay_handler(
    State(state): State<AppState>,
    run_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (run_id, req) = match (run_id, payload) {
        (Ok(Path(id)), Ok(Json(req))) => (id, req),
        (Err(rejection), _) => return path_rejection(correlation_id, rejection),
        (_, Err(rejection)) => return json_rejection(correlation_id, rejection),
    };
    let actor = match require_actor(&req.actor) {
        Ok(actor) => actor,
        Err(error) => return ApiErrorResponse::bad_request(error).into_response(),
    };
    respond(correlation_id, StatusCode::OK, state.engine().mark_paid(run_id, actor))
}

/// Handler for `POST /payroll/runs/{id}/void`.
async fn void_handler(
    State(state): State<AppState>,
    run_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<VoidRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (run_id, req) = match (run_id, payload) {
        (Ok(Path(id)), Ok(Json(req))) => (id, req),
        (Err(rejection), _) => return path_rejection(correlation_id, rejection),
        (_, Err(rejection)) => return json_rejection(correlation_id, rejection),
    };
    let actor = match require_actor(&req.actor) {
        Ok(actor) => actor,
        Err(error) => return ApiErrorResponse::bad_request(error).into_response(),
    };
    let result = state.engine().void(run_id, actor, req.reason.as_deref());
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for `PATCH /payroll/runs/{id}/items/{employee_id}`.
async fn amend_handler(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
    payload: Result<Json<AmendLineItemRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let ((run_id, employee_id), req) = match (path, payload) {
        (Ok(Path(ids)), Ok(Json(req))) => (ids, req),
        (Err(rejection), _) => return path_rejection(correlation_id, rejection),
        (_, Err(rejection)) => return json_rejection(correlation_id, rejection),
    };
    let (actor, amendment) = req.into_parts();
    let actor = match require_actor(&actor) {
        Ok(actor) => actor.to_string(),
        Err(error) => return ApiErrorResponse::bad_request(error).into_response(),
    };
    info!(
        correlation_id = %correlation_id,
        run_id = %run_id,
        employee_id = %employee_id,
        "Amending line item"
    );
    let result = state
        .engine()
        .amend_line_item(run_id, &employee_id, &amendment, &actor);
    respond(correlation_id, StatusCode::OK, result)
}

/// Serializes a successful result or maps the engine error.
fn respond<T: Serialize>(correlation_id: Uuid, status: StatusCode, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response(),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Request failed"
            );
            let api_error: ApiErrorResponse = err.into();
            (
                api_error.status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(api_error.error),
            )
                .into_response()
        }
    }
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

fn path_rejection(correlation_id: Uuid, rejection: PathRejection) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %rejection,
        "Invalid path parameter"
    );
    ApiErrorResponse::bad_request(ApiError::with_details(
        "INVALID_RUN_ID",
        "Run id must be a UUID",
        rejection.body_text(),
    ))
    .into_response()
}
