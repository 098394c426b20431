//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in the binary. It is
//! started and migrated on first use, then reused. Tests isolate themselves
//! by creating their own members, so no per-test cleanup is needed.

use anyhow::{Context, Result};
use market_core::domains::auth::JwtService;
use market_core::domains::demands::EngagementEngine;
use market_core::domains::offers::NegotiationEngine;
use market_core::domains::reviews::ReviewGate;
use market_core::kernel::{
    db, BasePriceOracle, BaseRealtimeDispatcher, MockPriceOracle, RecordingDispatcher,
    ServerDeps, StreamHub,
};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::ApiClient;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        db::migrate(&pool).await?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness: a fresh pool, engines wired to a recording dispatcher, and
/// an HTTP client over the real router.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let offer = ctx.negotiation.create_offer(listing.id, buyer.id, price).await.unwrap();
///     assert_eq!(ctx.dispatcher.kinds_sent_to(seller.id), vec![...]);
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub price_oracle: Arc<MockPriceOracle>,
    pub jwt_service: Arc<JwtService>,
    pub negotiation: NegotiationEngine,
    pub engagement: EngagementEngine,
    pub reviews: ReviewGate,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let dispatcher = Arc::new(RecordingDispatcher::new());
        Ok(Self::with_dispatcher(db_pool, dispatcher))
    }

    fn with_dispatcher(db_pool: PgPool, dispatcher: Arc<RecordingDispatcher>) -> Self {
        let as_dispatcher: Arc<dyn BaseRealtimeDispatcher> = dispatcher.clone();
        Self {
            negotiation: NegotiationEngine::new(db_pool.clone(), as_dispatcher.clone()),
            engagement: EngagementEngine::new(db_pool.clone(), as_dispatcher.clone()),
            reviews: ReviewGate::new(db_pool.clone(), as_dispatcher),
            price_oracle: Arc::new(MockPriceOracle::new(Decimal::new(125_000, 2))),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            dispatcher,
            db_pool,
        }
    }

    /// Engines sharing this pool whose realtime transport always fails.
    pub fn with_failing_dispatcher(&self) -> Self {
        Self::with_dispatcher(
            self.db_pool.clone(),
            Arc::new(RecordingDispatcher::failing()),
        )
    }

    /// Server dependencies pointing at this harness's doubles.
    pub fn server_deps(&self) -> ServerDeps {
        let price_oracle: Arc<dyn BasePriceOracle> = self.price_oracle.clone();
        ServerDeps::new(
            self.db_pool.clone(),
            self.dispatcher.clone(),
            StreamHub::new(),
            Some(price_oracle),
            self.jwt_service.clone(),
        )
    }

    /// HTTP client over the full router (middleware included).
    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.server_deps(), self.jwt_service.clone())
    }
}
