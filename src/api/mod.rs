//! HTTP API module for the payroll engine.
//!
//! This module exposes simulation, run processing, lifecycle transitions and
//! line-item amendments as JSON endpoints under `/payroll`.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ActorRequest, AmendLineItemRequest, PeriodRequest, VoidRequest};
pub use response::{ApiError, ApiErrorResponse, status_for};
pub use state::AppState;
