use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::channel::ChannelNames;
use super::inbox::{InboxError, InboxStore};
use super::recipients::RecipientResolver;
use super::subscriber::{SubscriberSession, Viewer};
use super::transport::{Envelope, LocalBroker, RedisTransport};
use crate::ids::UserId;

const KEEPALIVE_SECS: u64 = 15;

/// Where live subscriptions are read from.
#[derive(Clone)]
pub enum FeedSource {
    Local(Arc<LocalBroker>),
    Redis(RedisTransport),
}

#[derive(Clone)]
pub struct NotificationState {
    pub inbox: Arc<dyn InboxStore>,
    pub source: FeedSource,
    pub resolver: RecipientResolver,
    pub channels: ChannelNames,
}

/// Inbox listing, read receipts and the live event stream.
pub fn notification_router(state: NotificationState) -> Router {
    Router::new()
        .route(
            "/api/v1/users/:user_id/notifications",
            get(inbox_handler),
        )
        .route(
            "/api/v1/users/:user_id/notifications/stream",
            get(stream_handler),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler),
        )
        .with_state(state)
}

pub(crate) async fn inbox_handler(
    State(state): State<NotificationState>,
    Path(user_id): Path<String>,
) -> Response {
    let user = UserId(user_id);
    match state.inbox.visible_to(&user) {
        Ok(rows) => {
            let unread = rows.iter().filter(|row| !row.is_read()).count();
            let payload = json!({
                "user_id": user,
                "unread": unread,
                "items": rows,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}

pub(crate) async fn mark_read_handler(
    State(state): State<NotificationState>,
    Path(notification_id): Path<String>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&notification_id) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("'{notification_id}' is not a notification id"),
        );
    };

    match state.inbox.mark_read(id, Utc::now()) {
        Ok(row) => (StatusCode::OK, axum::Json(row)).into_response(),
        Err(InboxError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "notification not found".to_string())
        }
        Err(other) => error_response(StatusCode::SERVICE_UNAVAILABLE, other.to_string()),
    }
}

pub(crate) async fn stream_handler(
    State(state): State<NotificationState>,
    Path(user_id): Path<String>,
) -> Response {
    let viewer = Viewer::classify(UserId(user_id), &state.resolver);
    let session = SubscriberSession::new(viewer, &state.channels);

    let source: BoxStream<'static, Envelope> = match &state.source {
        FeedSource::Local(broker) => session.local_stream(broker),
        FeedSource::Redis(transport) => match transport.subscribe(session.channels()).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(user_id = %session.viewer().user_id, error = %err, "live feed unavailable");
                return error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string());
            }
        },
    };

    let events = session.fresh(source).map(|envelope| {
        let event = Event::default()
            .event(&envelope.event)
            .id(envelope.event_id.to_string())
            .json_data(&envelope)
            .unwrap_or_else(|_| Event::default().event(&envelope.event).data("serialization_error"));
        Ok::<_, Infallible>(event)
    });

    Sse::new(events)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(KEEPALIVE_SECS))
                .text("keepalive"),
        )
        .into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
