//! Complete demand action - closes the engagement and credits the broker

use sqlx::PgConnection;
use tracing::info;

use super::{demand_link, lock_owned_demand};
use crate::common::{DemandId, MarketError, MarketResult, MemberId};
use crate::domains::demands::models::{Demand, DemandInterest};
use crate::domains::members::Member;
use crate::domains::notifications::Notification;
use crate::kernel::{EventKind, Outbox};

/// Reputation credited to the hired broker per completed demand.
pub const REPUTATION_PER_COMPLETION: i32 = 1;

pub async fn complete_demand(
    demand_id: DemandId,
    trader_id: MemberId,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Demand> {
    let demand = lock_owned_demand(demand_id, trader_id, &mut *conn).await?;

    if !demand.is_active() {
        return Err(MarketError::DemandClosed);
    }
    if demand.hired_broker_id != Some(broker_id) {
        return Err(MarketError::NotHired);
    }

    let completed = Demand::mark_completed(demand.id, &mut *conn).await?;
    let reputation = Member::add_reputation(broker_id, REPUTATION_PER_COMPLETION, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Member"))?;
    let interested = DemandInterest::broker_ids_for_demand(demand.id, &mut *conn).await?;

    let notification = Notification::append(
        broker_id,
        &format!(
            "\"{}\" was marked complete. You earned {} reputation point",
            completed.title, REPUTATION_PER_COMPLETION
        ),
        Some(&demand_link(&completed)),
        &mut *conn,
    )
    .await?;

    outbox.push_to_all(interested, EventKind::DemandUpdate, &completed)?;
    outbox.notification(&notification)?;

    info!(
        demand_id = %completed.id,
        broker_id = %broker_id,
        reputation,
        "Demand completed"
    );

    Ok(completed)
}
