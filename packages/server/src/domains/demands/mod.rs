//! Demands domain - trader requests and the broker engagement lifecycle.
//!
//! ```text
//! active (open) ──hire──▶ active (hired) ──complete──▶ completed
//!       ▲                      │
//!       └───────unhire─────────┘
//! ```
//!
//! Brokers may express or withdraw interest only while the demand is open.

pub mod actions;
pub mod engine;
pub mod models;

pub use engine::EngagementEngine;
pub use models::{Demand, DemandInterest, DemandStatus};
