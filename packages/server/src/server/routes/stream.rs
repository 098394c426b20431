//! SSE streaming endpoint.
//!
//! GET /api/streams/me?token=JWT
//!
//! Subscribes the caller to their own `member:{id}` topic on the StreamHub
//! and forwards each `{type, payload}` value as an SSE event named `type`.
//! Every open stream is one connection; a member with several tabs gets
//! every event on each of them.
//!
//! Auth strategy: JWT passed as `?token=` query param, since EventSource
//! can't send custom headers. Falls back to the Authorization header.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::common::MarketError;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
}

pub async fn stream_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, MarketError> {
    let token = query
        .token
        .or_else(|| extract_bearer_token(&headers))
        .ok_or(MarketError::Unauthenticated)?;

    let claims = state
        .jwt_service
        .verify_token(&token)
        .map_err(|_| MarketError::Unauthenticated)?;
    let member_id = claims.member_id();

    let rx = state.stream_hub.subscribe(member_id).await;
    tracing::debug!(member_id = %member_id, "Realtime stream opened");

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
                .json_data(serde_json::json!({"missed": n}))
                .ok()
                .map(Ok),
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(KeepAlive::default()))
}

/// Extract Bearer token from Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(|t| t.to_string())
}
