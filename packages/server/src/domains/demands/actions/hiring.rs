//! Hire and unhire a broker on an active demand

use sqlx::PgConnection;
use tracing::info;

use super::{demand_link, lock_owned_demand};
use crate::common::{DemandId, MarketError, MarketResult, MemberId};
use crate::domains::demands::models::{Demand, DemandInterest};
use crate::domains::notifications::Notification;
use crate::kernel::{EventKind, Outbox};

/// Hire one of the interested brokers. Status stays `active`.
///
/// Every interested broker gets `demand_update`; the hired one also gets a
/// notification.
pub async fn hire_broker(
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
    if demand.hired_broker_id.is_some() {
        return Err(MarketError::AlreadyHired);
    }
    if !DemandInterest::exists(demand.id, broker_id, &mut *conn).await? {
        return Err(MarketError::NotFound("Interest"));
    }

    let updated = Demand::set_hired_broker(demand.id, Some(broker_id), &mut *conn).await?;
    let interested = DemandInterest::broker_ids_for_demand(demand.id, &mut *conn).await?;

    let notification = Notification::append(
        broker_id,
        &format!("You were hired for \"{}\"", updated.title),
        Some(&demand_link(&updated)),
        &mut *conn,
    )
    .await?;

    outbox.push_to_all(interested, EventKind::DemandUpdate, &updated)?;
    outbox.notification(&notification)?;

    info!(demand_id = %updated.id, broker_id = %broker_id, "Broker hired");

    Ok(updated)
}

/// Release the hired broker. When `broker_id` is given it must match.
pub async fn unhire_broker(
    demand_id: DemandId,
    trader_id: MemberId,
    broker_id: Option<MemberId>,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Demand> {
    let demand = lock_owned_demand(demand_id, trader_id, &mut *conn).await?;

    if !demand.is_active() {
        return Err(MarketError::DemandClosed);
    }
    let hired = demand.hired_broker_id.ok_or(MarketError::NotHired)?;
    if broker_id.is_some_and(|requested| requested != hired) {
        return Err(MarketError::NotHired);
    }

    let updated = Demand::set_hired_broker(demand.id, None, &mut *conn).await?;
    let interested = DemandInterest::broker_ids_for_demand(demand.id, &mut *conn).await?;

    let notification = Notification::append(
        hired,
        &format!("You were released from \"{}\"", updated.title),
        Some(&demand_link(&updated)),
        &mut *conn,
    )
    .await?;

    outbox.push_to_all(interested, EventKind::DemandUpdate, &updated)?;
    outbox.notification(&notification)?;

    info!(demand_id = %updated.id, broker_id = %hired, "Broker unhired");

    Ok(updated)
}
