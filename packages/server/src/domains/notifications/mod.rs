//! Notification ledger.
//!
//! The durable record of everything a member was told, independent of
//! whether a realtime push reached them. Business logic only appends rows;
//! the recipient may toggle read state.

pub mod models;

pub use models::notification::Notification;
