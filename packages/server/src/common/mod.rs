// Common types and utilities shared across the application

pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod pagination;
pub mod price;

pub use entity_ids::*;
pub use errors::{MarketError, MarketResult};
pub use id::Id;
pub use pagination::{Page, PageParams};
pub use price::validate_price;
