//! Server dependencies shared by routes and engines.
//!
//! External collaborators sit behind traits so tests can swap them out.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{BasePriceOracle, BaseRealtimeDispatcher, StreamHub};

#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Delivers realtime events to connected members
    pub dispatcher: Arc<dyn BaseRealtimeDispatcher>,
    /// Connection registry the SSE endpoint subscribes to. In production this
    /// is the same hub as `dispatcher`.
    pub stream_hub: StreamHub,
    /// None when PRICE_ORACLE_URL is not configured
    pub price_oracle: Option<Arc<dyn BasePriceOracle>>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        dispatcher: Arc<dyn BaseRealtimeDispatcher>,
        stream_hub: StreamHub,
        price_oracle: Option<Arc<dyn BasePriceOracle>>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db_pool,
            dispatcher,
            stream_hub,
            price_oracle,
            jwt_service,
        }
    }

    /// Production wiring: the stream hub doubles as the dispatcher.
    pub fn with_stream_hub(
        db_pool: PgPool,
        stream_hub: StreamHub,
        price_oracle: Option<Arc<dyn BasePriceOracle>>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        let dispatcher: Arc<dyn BaseRealtimeDispatcher> = Arc::new(stream_hub.clone());
        Self::new(db_pool, dispatcher, stream_hub, price_oracle, jwt_service)
    }
}
