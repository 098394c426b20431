// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use market_core::domains::auth::JwtService;
use market_core::kernel::{db, BasePriceOracle, HttpPriceOracle, ServerDeps, StreamHub};
use market_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,market_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting marketplace API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let pool = db::connect(&config).await?;

    let price_oracle: Option<Arc<dyn BasePriceOracle>> = match &config.price_oracle_url {
        Some(url) => Some(Arc::new(HttpPriceOracle::new(url.clone())?)),
        None => {
            tracing::warn!("PRICE_ORACLE_URL not set, price estimation disabled");
            None
        }
    };

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let stream_hub = StreamHub::new();

    // Drop channels whose connections have all closed
    let hub_for_cleanup = stream_hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            hub_for_cleanup.cleanup().await;
        }
    });

    let deps = ServerDeps::with_stream_hub(pool, stream_hub, price_oracle, jwt_service);
    let app = build_app(deps, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
