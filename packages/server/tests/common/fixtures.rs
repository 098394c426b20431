//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use market_core::common::MemberId;
use market_core::domains::demands::Demand;
use market_core::domains::listings::Listing;
use market_core::domains::members::{Member, MemberRole};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::TestHarness;

pub async fn create_trader(pool: &PgPool, name: &str) -> Result<Member> {
    Member::create(MemberId::new(), name, MemberRole::Trader, pool).await
}

pub async fn create_broker(pool: &PgPool, name: &str) -> Result<Member> {
    Member::create(MemberId::new(), name, MemberRole::Broker, pool).await
}

/// An available listing priced in whole units.
pub async fn create_listing(pool: &PgPool, seller: &Member, price: i64) -> Result<Listing> {
    Listing::create(
        seller.id,
        "Pallet of copper wire",
        Some("400kg, stripped"),
        Decimal::new(price, 0),
        pool,
    )
    .await
}

pub async fn create_demand(pool: &PgPool, trader: &Member) -> Result<Demand> {
    Demand::create(
        trader.id,
        "Source 40t of rebar",
        &serde_json::json!({"grade": "B500B", "tonnes": 40}),
        pool,
    )
    .await
}

/// A demand with `broker` interested and hired, still active.
pub async fn create_hired_demand(
    ctx: &TestHarness,
    trader: &Member,
    broker: &Member,
) -> Result<Demand> {
    let demand = create_demand(&ctx.db_pool, trader).await?;
    ctx.engagement.express_interest(demand.id, broker.id).await?;
    let demand = ctx.engagement.hire(demand.id, trader.id, broker.id).await?;
    Ok(demand)
}

pub fn price(units: i64) -> Decimal {
    Decimal::new(units, 0)
}
