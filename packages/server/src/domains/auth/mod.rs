//! Auth domain - bearer token verification.
//!
//! Tokens are issued by the external identity service with a shared secret.
//! This server only verifies them to learn the acting member.

pub mod jwt;

pub use jwt::{Claims, JwtService};
