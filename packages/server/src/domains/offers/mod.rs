//! Offers domain - the Negotiation Engine.
//!
//! Turn-based price negotiation between a listing's seller and a buyer. The
//! transition rule lives in `machines`, the transactional side effects in
//! `actions`, and `NegotiationEngine` wraps both in commit-then-dispatch.

pub mod actions;
pub mod engine;
pub mod machines;
pub mod models;

pub use engine::NegotiationEngine;
pub use machines::{OfferAction, Side};
pub use models::offer::{Offer, OfferStatus};
