//! Realtime event types and the dispatcher seam.
//!
//! Engines never talk to a transport directly. They receive an
//! `Arc<dyn BaseRealtimeDispatcher>` at construction and hand it
//! `(recipient, event)` pairs after their transaction commits.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::MemberId;

/// Event names delivered to clients (the SSE `event:` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewOffer,
    OfferUpdate,
    DemandUpdate,
    InterestUpdate,
    ReviewReceived,
    NewNotification,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewOffer => "new_offer",
            EventKind::OfferUpdate => "offer_update",
            EventKind::DemandUpdate => "demand_update",
            EventKind::InterestUpdate => "interest_update",
            EventKind::ReviewReceived => "review_received",
            EventKind::NewNotification => "new_notification",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A realtime event: `{"type": "...", "payload": {...}}`.
///
/// The payload mirrors the REST response body for the same entity so a client
/// can apply it without re-fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

impl RealtimeEvent {
    /// Serializes `payload` eagerly. Engines build events inside their
    /// transaction, so a serialization failure rolls the change back.
    pub fn new<T: Serialize>(kind: EventKind, payload: &T) -> Result<Self> {
        let payload = serde_json::to_value(payload)
            .with_context(|| format!("Failed to serialize {} payload", kind))?;
        Ok(Self { kind, payload })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind,
            "payload": self.payload,
        })
    }
}

/// Connection registry abstraction: deliver an event to every live
/// connection of a member. Members with no connection are a silent no-op.
#[async_trait]
pub trait BaseRealtimeDispatcher: Send + Sync {
    async fn send(&self, recipient: MemberId, event: RealtimeEvent) -> Result<()>;
}
