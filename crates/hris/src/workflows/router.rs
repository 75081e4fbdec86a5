use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::absence::AbsenceSubmission;
use super::domain::DecisionInput;
use super::leave::LeaveSubmission;
use super::repository::RepositoryError;
use super::return_to_work::ReturnSubmission;
use super::service::{HrService, WorkflowError};
use crate::ids::RecordId;

/// Router exposing leave, absence and return-to-work endpoints.
pub fn workflow_router(service: Arc<HrService>) -> Router {
    Router::new()
        .route("/api/v1/leave-requests", post(submit_leave_handler))
        .route("/api/v1/leave-requests/:leave_id", get(leave_handler))
        .route(
            "/api/v1/leave-requests/:leave_id/decision",
            post(decide_leave_handler),
        )
        .route("/api/v1/absence-requests", post(submit_absence_handler))
        .route("/api/v1/absence-requests/:absence_id", get(absence_handler))
        .route(
            "/api/v1/absence-requests/:absence_id/decision",
            post(decide_absence_handler),
        )
        .route("/api/v1/return-to-work", post(record_return_handler))
        .route("/api/v1/return-to-work/:rtw_id", get(return_handler))
        .with_state(service)
}

pub(crate) async fn submit_leave_handler(
    State(service): State<Arc<HrService>>,
    axum::Json(submission): axum::Json<LeaveSubmission>,
) -> Response {
    respond(StatusCode::CREATED, service.submit_leave(submission).await)
}

pub(crate) async fn leave_handler(
    State(service): State<Arc<HrService>>,
    Path(leave_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.leave(&RecordId(leave_id)))
}

pub(crate) async fn decide_leave_handler(
    State(service): State<Arc<HrService>>,
    Path(leave_id): Path<String>,
    axum::Json(input): axum::Json<DecisionInput>,
) -> Response {
    respond(
        StatusCode::OK,
        service.decide_leave(&RecordId(leave_id), input).await,
    )
}

pub(crate) async fn submit_absence_handler(
    State(service): State<Arc<HrService>>,
    axum::Json(submission): axum::Json<AbsenceSubmission>,
) -> Response {
    respond(StatusCode::CREATED, service.submit_absence(submission).await)
}

pub(crate) async fn absence_handler(
    State(service): State<Arc<HrService>>,
    Path(absence_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.absence(&RecordId(absence_id)))
}

pub(crate) async fn decide_absence_handler(
    State(service): State<Arc<HrService>>,
    Path(absence_id): Path<String>,
    axum::Json(input): axum::Json<DecisionInput>,
) -> Response {
    respond(
        StatusCode::OK,
        service.decide_absence(&RecordId(absence_id), input).await,
    )
}

pub(crate) async fn record_return_handler(
    State(service): State<Arc<HrService>>,
    axum::Json(submission): axum::Json<ReturnSubmission>,
) -> Response {
    respond(StatusCode::CREATED, service.record_return(submission).await)
}

pub(crate) async fn return_handler(
    State(service): State<Arc<HrService>>,
    Path(rtw_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.return_to_work(&RecordId(rtw_id)))
}

fn respond<T: Serialize>(success: StatusCode, result: Result<T, WorkflowError>) -> Response {
    match result {
        Ok(record) => (success, axum::Json(record)).into_response(),
        Err(WorkflowError::Violation(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
                "field": violation.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(WorkflowError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "record not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err @ WorkflowError::AlreadyDecided { .. }) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(WorkflowError::Repository(err @ (RepositoryError::Conflict | RepositoryError::Stale))) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
