// B2B Marketplace - API Core
//
// Offer negotiation on listings, broker engagement on demands, post-deal
// reviews and the notification ledger. Every engine writes in one
// transaction and pushes realtime events only after commit.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
