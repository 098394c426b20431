//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::auth::JwtService;
use crate::domains::demands::EngagementEngine;
use crate::domains::offers::NegotiationEngine;
use crate::domains::reviews::ReviewGate;
use crate::kernel::{BasePriceOracle, ServerDeps, StreamHub};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{demands, health, listings, members, notifications, offers, reviews, stream};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub negotiation: NegotiationEngine,
    pub engagement: EngagementEngine,
    pub reviews: ReviewGate,
    pub stream_hub: StreamHub,
    pub price_oracle: Option<Arc<dyn BasePriceOracle>>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Engines share the pool and the dispatcher from `deps`.
    pub fn from_deps(deps: &ServerDeps) -> Self {
        Self {
            db_pool: deps.db_pool.clone(),
            negotiation: NegotiationEngine::new(deps.db_pool.clone(), deps.dispatcher.clone()),
            engagement: EngagementEngine::new(deps.db_pool.clone(), deps.dispatcher.clone()),
            reviews: ReviewGate::new(deps.db_pool.clone(), deps.dispatcher.clone()),
            stream_hub: deps.stream_hub.clone(),
            price_oracle: deps.price_oracle.clone(),
            jwt_service: deps.jwt_service.clone(),
        }
    }
}

/// Empty list means any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let state = AppState::from_deps(&deps);
    let jwt_service = deps.jwt_service.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/streams/me", get(stream::stream_handler))
        // Listings
        .route(
            "/listings",
            post(listings::create_listing).get(listings::list_listings),
        )
        .route("/listings/price-estimate", post(listings::estimate_price))
        .route("/listings/:id", get(listings::get_listing))
        .route("/listings/:id/offers", get(listings::listing_offers))
        // Offers
        .route("/offers", get(offers::my_offers))
        .route(
            "/offers/:id",
            post(offers::create_offer).get(offers::get_offer),
        )
        .route("/offers/:id/respond", put(offers::respond_to_offer))
        // Demands
        .route(
            "/demands",
            post(demands::create_demand).get(demands::list_demands),
        )
        .route("/demands/:id", get(demands::get_demand))
        .route("/demands/:id/interests", get(demands::list_interests))
        .route("/demands/:id/interest", post(demands::toggle_interest))
        .route(
            "/demands/:id/interest/:broker_id",
            delete(demands::dismiss_interest),
        )
        .route("/demands/:id/hire/:broker_id", post(demands::hire_broker))
        .route("/demands/:id/unhire/:broker_id", post(demands::unhire_broker))
        .route(
            "/demands/:id/complete/:broker_id",
            post(demands::complete_demand),
        )
        // Reviews and members
        .route("/reviews", post(reviews::submit_review))
        .route("/members/:id", get(members::get_member))
        .route("/members/:id/reviews", get(members::member_reviews))
        // Notification ledger
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/:id/read", put(notifications::mark_read))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
