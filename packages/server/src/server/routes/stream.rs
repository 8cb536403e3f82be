//! SSE notification stream.
//!
//! GET /api/streams/notifications?token=JWT
//!
//! EventSource can't send custom headers, so the JWT may be passed as a
//! `?token=` query param; the Authorization header is accepted too. Each
//! member only ever subscribes to their own `notifications:{id}` topic.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::debug;

use crate::kernel::notification_topic;
use crate::server::app::AppState;
use crate::server::middleware::{bearer_token, verify};

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
}

pub async fn stream_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let token = query
        .token
        .as_deref()
        .or_else(|| bearer_token(&headers))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let user = verify(&state.jwt_service, token).ok_or(StatusCode::UNAUTHORIZED)?;

    let topic = notification_topic(user.member_id);
    debug!(topic = %topic, "notification stream opened");
    let rx = state.deps.stream_hub.subscribe(&topic).await;

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = BroadcastStream::new(rx).filter_map(|result| async {
        match result {
            Ok(value) => {
                let event_name = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("message");
                Event::default()
                    .event(event_name)
                    .json_data(&value)
                    .ok()
                    .map(Ok)
            }
            Err(BroadcastStreamRecvError::Lagged(n)) => Event::default()
                .event("lagged")
                .json_data(&serde_json::json!({"missed": n}))
                .ok()
                .map(Ok),
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(KeepAlive::default()))
}
