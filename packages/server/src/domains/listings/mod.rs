//! Listings domain - items posted for sale.
//!
//! A listing is created `available` and flips to `sold` exactly once, inside
//! the transaction that accepts one of its offers.

pub mod models;

pub use models::listing::{Listing, ListingStatus};
