use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::router::submit_leave_handler;
use crate::workflows::{workflow_router, WorkflowStores};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn leave_submission_returns_created_record() {
    let (service, notifier, _stores) = build_service();
    let router = workflow_router(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/leave-requests",
            json!({
                "employee_id": "E-1001",
                "leave_kind": "sick",
                "start_date": "2026-11-02",
                "end_date": "2026-11-03",
                "reason": "Flu"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["days"], 2);
    assert_eq!(body["employee"]["department_id"], "finance");
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn invalid_submission_names_the_field() {
    let (service, notifier, _stores) = build_service();
    let router = workflow_router(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/leave-requests",
            json!({
                "employee_id": "E-1001",
                "leave_kind": "vacation",
                "start_date": "2026-11-06",
                "end_date": "2026-11-02",
                "reason": "Trip"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "end_date");
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn unknown_records_return_not_found() {
    let (service, _notifier, _stores) = build_service();
    let router = workflow_router(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/leave-requests/leave-424242"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(post_json(
            "/api/v1/absence-requests/absence-424242/decision",
            json!({ "decision": "approve", "decided_by": "sup-finance" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_decision_conflicts() {
    let (service, notifier, _stores) = build_service();
    let absence = service
        .submit_absence(absence_submission("E-2001"))
        .await
        .expect("absence accepted");
    let router = workflow_router(service);
    let uri = format!("/api/v1/absence-requests/{}/decision", absence.absence_id);

    let response = router
        .clone()
        .oneshot(post_json(
            &uri,
            json!({ "decision": "reject", "decided_by": "sup-warehouse", "remarks": "Short staffed" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["decision"]["remarks"], "Short staffed");

    let response = router
        .clone()
        .oneshot(post_json(
            &uri,
            json!({ "decision": "approve", "decided_by": "sup-warehouse" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(get(&format!("/api/v1/absence-requests/{}", absence.absence_id)))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(notifier.events().len(), 2);
}

#[tokio::test]
async fn return_to_work_is_created_and_readable() {
    let (service, _notifier, _stores) = build_service();
    let router = workflow_router(service);

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/return-to-work",
            json!({ "employee_id": "E-3001", "returned_on": "2026-11-09" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    let rtw_id = body["rtw_id"].as_str().expect("rtw id").to_string();

    let response = router
        .oneshot(get(&format!("/api/v1/return-to-work/{rtw_id}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["returned_on"], "2026-11-09");
    assert_eq!(body["leave_id"], Value::Null);
}

#[tokio::test]
async fn repository_failure_maps_to_internal_error() {
    let stores = WorkflowStores {
        leaves: Arc::new(UnavailableStore::default()),
        ..WorkflowStores::in_memory()
    };
    let (service, _notifier, _stores) = build_service_with(stores);

    let response =
        submit_leave_handler(State(service), axum::Json(leave_submission("E-1001"))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("database offline")));
}
