use crate::infra::{AppState, Components};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use hris::notifications::notification_router;
use hris::workflows::workflow_router;
use serde_json::json;

pub(crate) fn with_service_routes(components: &Components) -> axum::Router {
    workflow_router(components.service.clone())
        .merge(notification_router(components.notifications.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_components, load_directory};
    use axum::body::Body;
    use axum::http::Request;
    use hris::config::NotificationConfig;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn components() -> Components {
        let directory = Arc::new(load_directory(None).expect("sample directory"));
        build_components(&NotificationConfig::default(), directory).expect("components")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let router = with_service_routes(&components());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn supervisor_inbox_fills_after_leave_submission() {
        let components = components();
        let router = with_service_routes(&components);

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/leave-requests")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "employee_id": "E-2001",
                            "leave_kind": "vacation",
                            "start_date": "2026-12-21",
                            "end_date": "2026-12-24",
                            "reason": "Holidays"
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::get("/api/v1/users/sup-warehouse/notifications")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["unread"], 1);
        assert_eq!(body["items"][0]["type"], "leave.request_created");
        assert_eq!(body["items"][0]["data"]["status"], "pending");
    }
}
