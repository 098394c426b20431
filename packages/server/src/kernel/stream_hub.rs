//! In-process pub/sub hub backing the realtime channel.
//!
//! Every member has one topic (`member:{id}`). Each open SSE connection holds
//! its own broadcast receiver, so a publish fans out to all of a member's
//! tabs and devices. Publishing to a member with no receivers is a no-op.
//!
//! # Usage
//!
//! Producers (engines, via `BaseRealtimeDispatcher`):
//!   hub.send(member_id, event).await?;
//!
//! Consumers (SSE endpoint):
//!   let rx = hub.subscribe(member_id).await;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::common::MemberId;
use crate::kernel::realtime::{BaseRealtimeDispatcher, RealtimeEvent};

/// Topic-keyed broadcast registry.
///
/// Thread-safe, cloneable. Payloads are the JSON form of `RealtimeEvent`.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Create a new StreamHub with default capacity (256 messages per channel).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub fn member_topic(member_id: MemberId) -> String {
        format!("member:{}", member_id)
    }

    /// Publish a JSON value to a topic. Returns the number of receivers reached.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) -> usize {
        let channels = self.channels.read().await;
        match channels.get(topic) {
            // Err only means every receiver has gone away since the last cleanup
            Some(tx) => tx.send(value).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribe to a member's topic. Creates the channel if it doesn't exist.
    pub async fn subscribe(&self, member_id: MemberId) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(Self::member_topic(member_id))
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Number of live connections for a member.
    pub async fn connection_count(&self, member_id: MemberId) -> usize {
        self.channels
            .read()
            .await
            .get(&Self::member_topic(member_id))
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Remove channels with zero subscribers (housekeeping).
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRealtimeDispatcher for StreamHub {
    async fn send(&self, recipient: MemberId, event: RealtimeEvent) -> Result<()> {
        let delivered = self
            .publish(&Self::member_topic(recipient), event.to_json())
            .await;
        tracing::debug!(
            recipient = %recipient,
            event = %event.kind,
            connections = delivered,
            "Realtime event published"
        );
        Ok(())
    }
}
