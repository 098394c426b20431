//! Members domain - traders and brokers as seen by the marketplace.
//!
//! Identity lives in the external auth service; rows here carry the role
//! and the broker reputation counter.

pub mod models;

pub use models::member::{Member, MemberRole};
