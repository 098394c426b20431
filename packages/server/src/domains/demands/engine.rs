use sqlx::PgPool;
use std::sync::Arc;

use super::actions;
use super::models::{Demand, DemandInterest};
use crate::common::{DemandId, MarketError, MarketResult, MemberId};
use crate::domains::members::{Member, MemberRole};
use crate::kernel::{BaseRealtimeDispatcher, Outbox};

/// Engagement Engine - the only writer of demands and broker interests.
#[derive(Clone)]
pub struct EngagementEngine {
    pool: PgPool,
    dispatcher: Arc<dyn BaseRealtimeDispatcher>,
}

impl EngagementEngine {
    pub fn new(pool: PgPool, dispatcher: Arc<dyn BaseRealtimeDispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    /// Post a demand. Traders only.
    pub async fn create_demand(
        &self,
        trader_id: MemberId,
        title: &str,
        details: &serde_json::Value,
    ) -> MarketResult<Demand> {
        let trader = Member::find_by_id(trader_id, &self.pool)
            .await?
            .ok_or(MarketError::NotFound("Member"))?;
        if trader.role != MemberRole::Trader {
            return Err(MarketError::forbidden("only traders can post demands"));
        }

        let demand = Demand::create(trader_id, title, details, &self.pool).await?;
        tracing::info!(demand_id = %demand.id, trader_id = %trader_id, "Demand created");
        Ok(demand)
    }

    /// Interests on a demand, visible to its owner only.
    pub async fn interests(
        &self,
        demand_id: DemandId,
        trader_id: MemberId,
    ) -> MarketResult<Vec<DemandInterest>> {
        let demand = Demand::find_by_id(demand_id, &self.pool)
            .await?
            .ok_or(MarketError::NotFound("Demand"))?;
        if demand.trader_id != trader_id {
            return Err(MarketError::forbidden("only the demand owner can see interests"));
        }
        Ok(DemandInterest::find_for_demand(demand_id, &self.pool).await?)
    }

    pub async fn express_interest(
        &self,
        demand_id: DemandId,
        broker_id: MemberId,
    ) -> MarketResult<bool> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let added = actions::express_interest(demand_id, broker_id, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(added)
    }

    pub async fn withdraw_interest(
        &self,
        demand_id: DemandId,
        broker_id: MemberId,
    ) -> MarketResult<bool> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let removed =
            actions::withdraw_interest(demand_id, broker_id, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(removed)
    }

    /// Returns whether the broker is interested after the call.
    pub async fn toggle_interest(
        &self,
        demand_id: DemandId,
        broker_id: MemberId,
    ) -> MarketResult<bool> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let interested =
            actions::toggle_interest(demand_id, broker_id, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(interested)
    }

    pub async fn hire(
        &self,
        demand_id: DemandId,
        trader_id: MemberId,
        broker_id: MemberId,
    ) -> MarketResult<Demand> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let demand =
            actions::hire_broker(demand_id, trader_id, broker_id, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(demand)
    }

    pub async fn unhire(
        &self,
        demand_id: DemandId,
        trader_id: MemberId,
        broker_id: Option<MemberId>,
    ) -> MarketResult<Demand> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let demand =
            actions::unhire_broker(demand_id, trader_id, broker_id, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(demand)
    }

    pub async fn dismiss_interest(
        &self,
        demand_id: DemandId,
        trader_id: MemberId,
        broker_id: MemberId,
    ) -> MarketResult<Demand> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let demand =
            actions::dismiss_interest(demand_id, trader_id, broker_id, &mut tx, &mut outbox)
                .await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(demand)
    }

    pub async fn complete(
        &self,
        demand_id: DemandId,
        trader_id: MemberId,
        broker_id: MemberId,
    ) -> MarketResult<Demand> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let demand =
            actions::complete_demand(demand_id, trader_id, broker_id, &mut tx, &mut outbox)
                .await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(demand)
    }
}
