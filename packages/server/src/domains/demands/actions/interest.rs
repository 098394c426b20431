//! Broker interest - express, withdraw, toggle, and owner dismissal

use sqlx::PgConnection;
use tracing::info;

use super::{demand_link, lock_owned_demand, InterestUpdate};
use crate::common::{DemandId, MarketError, MarketResult, MemberId};
use crate::domains::demands::models::{Demand, DemandInterest};
use crate::domains::members::{Member, MemberRole};
use crate::domains::notifications::Notification;
use crate::kernel::{EventKind, Outbox};

/// Register interest. Returns true if a new row was written; a repeat call
/// is a no-op that returns false.
pub async fn express_interest(
    demand_id: DemandId,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<bool> {
    let demand = lock_open_demand(demand_id, broker_id, &mut *conn).await?;
    add_interest(&demand, broker_id, conn, outbox).await
}

/// Remove interest. Returns true if a row was removed.
pub async fn withdraw_interest(
    demand_id: DemandId,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<bool> {
    let demand = lock_open_demand(demand_id, broker_id, &mut *conn).await?;
    remove_interest(&demand, broker_id, conn, outbox).await
}

/// Flip the broker's interest. Returns whether interest is now present.
pub async fn toggle_interest(
    demand_id: DemandId,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<bool> {
    let demand = lock_open_demand(demand_id, broker_id, &mut *conn).await?;

    if DemandInterest::exists(demand.id, broker_id, &mut *conn).await? {
        remove_interest(&demand, broker_id, conn, outbox).await?;
        Ok(false)
    } else {
        add_interest(&demand, broker_id, conn, outbox).await?;
        Ok(true)
    }
}

/// Owner removes a broker's interest before anyone is hired.
pub async fn dismiss_interest(
    demand_id: DemandId,
    trader_id: MemberId,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Demand> {
    let demand = lock_owned_demand(demand_id, trader_id, &mut *conn).await?;

    if !demand.is_open() {
        return Err(MarketError::DemandClosed);
    }
    if !DemandInterest::delete(demand.id, broker_id, &mut *conn).await? {
        return Err(MarketError::NotFound("Interest"));
    }

    let notification = Notification::append(
        broker_id,
        &format!("Your interest in \"{}\" was dismissed", demand.title),
        Some(&demand_link(&demand)),
        &mut *conn,
    )
    .await?;

    outbox.emit(
        broker_id,
        EventKind::InterestUpdate,
        &InterestUpdate {
            demand_id: demand.id,
            broker_id,
            interested: false,
        },
    )?;
    outbox.notification(&notification)?;

    info!(demand_id = %demand.id, broker_id = %broker_id, "Interest dismissed");

    Ok(demand)
}

/// Lock the demand and apply the guards shared by every broker-side call.
async fn lock_open_demand(
    demand_id: DemandId,
    broker_id: MemberId,
    conn: &mut PgConnection,
) -> MarketResult<Demand> {
    let broker = Member::find_by_id_in(broker_id, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Member"))?;
    if broker.role != MemberRole::Broker {
        return Err(MarketError::forbidden("only brokers can express interest"));
    }

    let demand = Demand::find_for_update(demand_id, &mut *conn)
        .await?
        .ok_or(MarketError::NotFound("Demand"))?;

    if demand.trader_id == broker_id {
        return Err(MarketError::forbidden("cannot be interested in your own demand"));
    }
    if !demand.is_open() {
        return Err(MarketError::DemandClosed);
    }
    Ok(demand)
}

async fn add_interest(
    demand: &Demand,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<bool> {
    if !DemandInterest::insert_if_absent(demand.id, broker_id, &mut *conn).await? {
        return Ok(false);
    }

    let notification = Notification::append(
        demand.trader_id,
        &format!("A broker is interested in \"{}\"", demand.title),
        Some(&demand_link(demand)),
        &mut *conn,
    )
    .await?;

    outbox.emit(
        demand.trader_id,
        EventKind::InterestUpdate,
        &InterestUpdate {
            demand_id: demand.id,
            broker_id,
            interested: true,
        },
    )?;
    outbox.notification(&notification)?;

    info!(demand_id = %demand.id, broker_id = %broker_id, "Interest expressed");
    Ok(true)
}

async fn remove_interest(
    demand: &Demand,
    broker_id: MemberId,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<bool> {
    if !DemandInterest::delete(demand.id, broker_id, conn).await? {
        return Ok(false);
    }

    outbox.emit(
        demand.trader_id,
        EventKind::InterestUpdate,
        &InterestUpdate {
            demand_id: demand.id,
            broker_id,
            interested: false,
        },
    )?;

    info!(demand_id = %demand.id, broker_id = %broker_id, "Interest withdrawn");
    Ok(true)
}
