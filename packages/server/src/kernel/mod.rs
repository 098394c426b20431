//! Kernel module - server infrastructure and dependencies.

pub mod db;
pub mod deps;
pub mod outbox;
pub mod price_oracle;
pub mod realtime;
pub mod stream_hub;
pub mod test_dependencies;

pub use deps::ServerDeps;
pub use outbox::Outbox;
pub use price_oracle::{BasePriceOracle, HttpPriceOracle, PriceEstimate, PriceEstimateRequest};
pub use realtime::{BaseRealtimeDispatcher, EventKind, RealtimeEvent};
pub use stream_hub::StreamHub;
pub use test_dependencies::{MockPriceOracle, RecordingDispatcher};
