//! Negotiation actions.
//!
//! Each action runs inside a transaction owned by the caller, writes its
//! ledger rows there, and queues realtime events on the caller's outbox.

pub mod create_offer;
pub mod respond_to_offer;

pub use create_offer::create_offer;
pub use respond_to_offer::respond_to_offer;
