//! Engagement actions.
//!
//! Same contract as the negotiation actions: the caller owns the transaction
//! and the outbox. Every guard reads the demand through `FOR UPDATE`.

pub mod complete_demand;
pub mod hiring;
pub mod interest;

pub use complete_demand::complete_demand;
pub use hiring::{hire_broker, unhire_broker};
pub use interest::{dismiss_interest, express_interest, toggle_interest, withdraw_interest};

use serde::Serialize;
use sqlx::PgConnection;

use crate::common::{DemandId, MarketError, MarketResult, MemberId};
use crate::domains::demands::models::Demand;

/// `interest_update` payload.
#[derive(Debug, Clone, Serialize)]
pub struct InterestUpdate {
    pub demand_id: DemandId,
    pub broker_id: MemberId,
    pub interested: bool,
}

/// Lock a demand and check the actor owns it.
async fn lock_owned_demand(
    demand_id: DemandId,
    trader_id: MemberId,
    conn: &mut PgConnection,
) -> MarketResult<Demand> {
    let demand = Demand::find_for_update(demand_id, conn)
        .await?
        .ok_or(MarketError::NotFound("Demand"))?;

    if demand.trader_id != trader_id {
        return Err(MarketError::forbidden("only the demand owner can do this"));
    }
    Ok(demand)
}

fn demand_link(demand: &Demand) -> String {
    format!("/demands/{}", demand.id)
}
