// Test doubles for kernel traits
//
// Injected into engines and ServerDeps so tests can observe realtime delivery
// and stub the price oracle without a socket layer or network.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::price_oracle::{BasePriceOracle, PriceEstimate, PriceEstimateRequest};
use super::realtime::{BaseRealtimeDispatcher, EventKind, RealtimeEvent};
use crate::common::MemberId;

// =============================================================================
// Recording Dispatcher
// =============================================================================

/// Records every event handed to it instead of delivering it.
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(MemberId, RealtimeEvent)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// A dispatcher whose every send fails (transport down).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<(MemberId, RealtimeEvent)> {
        self.sent.lock().unwrap().clone()
    }

    /// Events delivered to one member, in order.
    pub fn sent_to(&self, member_id: MemberId) -> Vec<RealtimeEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(recipient, _)| *recipient == member_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn kinds_sent_to(&self, member_id: MemberId) -> Vec<EventKind> {
        self.sent_to(member_id).into_iter().map(|e| e.kind).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRealtimeDispatcher for RecordingDispatcher {
    async fn send(&self, recipient: MemberId, event: RealtimeEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("connection registry unavailable");
        }
        self.sent.lock().unwrap().push((recipient, event));
        Ok(())
    }
}

// =============================================================================
// Mock Price Oracle
// =============================================================================

/// Returns a fixed estimate and records the requests it saw.
pub struct MockPriceOracle {
    estimate: Decimal,
    requests: Mutex<Vec<PriceEstimateRequest>>,
}

impl MockPriceOracle {
    pub fn new(estimate: Decimal) -> Self {
        Self {
            estimate,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PriceEstimateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePriceOracle for MockPriceOracle {
    async fn estimate(&self, request: &PriceEstimateRequest) -> Result<PriceEstimate> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(PriceEstimate {
            estimated_price: self.estimate,
        })
    }
}
