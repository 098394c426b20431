//! Post-commit realtime delivery.
//!
//! Engines collect `(recipient, event)` pairs while their transaction is open
//! and call `deliver` only after `commit()` returns. If anything fails before
//! that, the outbox is dropped with the transaction and nothing is sent.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::common::MemberId;
use crate::domains::notifications::models::Notification;
use crate::kernel::realtime::{BaseRealtimeDispatcher, EventKind, RealtimeEvent};

#[derive(Debug, Default)]
pub struct Outbox {
    entries: Vec<(MemberId, RealtimeEvent)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recipient: MemberId, event: RealtimeEvent) {
        self.entries.push((recipient, event));
    }

    /// Queue an event for each recipient, in order.
    pub fn push_to_all<T: Serialize>(
        &mut self,
        recipients: impl IntoIterator<Item = MemberId>,
        kind: EventKind,
        payload: &T,
    ) -> Result<()> {
        let event = RealtimeEvent::new(kind, payload)?;
        for recipient in recipients {
            self.push(recipient, event.clone());
        }
        Ok(())
    }

    pub fn emit<T: Serialize>(
        &mut self,
        recipient: MemberId,
        kind: EventKind,
        payload: &T,
    ) -> Result<()> {
        self.push(recipient, RealtimeEvent::new(kind, payload)?);
        Ok(())
    }

    /// Queue `new_notification` for the ledger row's recipient.
    pub fn notification(&mut self, notification: &Notification) -> Result<()> {
        self.emit(
            notification.recipient_id,
            EventKind::NewNotification,
            notification,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver every queued event. Failures are logged and swallowed: the
    /// notification ledger is the durable record, delivery is best effort.
    pub async fn deliver(self, dispatcher: &Arc<dyn BaseRealtimeDispatcher>) {
        for (recipient, event) in self.entries {
            let kind = event.kind;
            if let Err(e) = dispatcher.send(recipient, event).await {
                tracing::warn!(
                    recipient = %recipient,
                    event = %kind,
                    error = %e,
                    "Realtime delivery failed"
                );
            }
        }
    }
}
