use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{DemandId, MarketError, MarketResult, MemberId, PageParams};
use crate::domains::demands::{Demand, DemandInterest};
use crate::server::app::AppState;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CreateDemandRequest {
    pub title: String,
    #[serde(default = "empty_details")]
    pub details: serde_json::Value,
}

fn empty_details() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Serialize)]
pub struct InterestResponse {
    pub demand_id: DemandId,
    pub interested: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub message: String,
    pub demand: Demand,
}

pub async fn create_demand(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateDemandRequest>,
) -> MarketResult<(StatusCode, Json<Demand>)> {
    let demand = state
        .engagement
        .create_demand(user.member_id, &body.title, &body.details)
        .await?;
    Ok((StatusCode::CREATED, Json(demand)))
}

/// Active demands, newest first.
pub async fn list_demands(
    Extension(state): Extension<AppState>,
    Query(page): Query<PageParams>,
) -> MarketResult<Json<Vec<Demand>>> {
    let demands = Demand::find_active(page.validate(), &state.db_pool).await?;
    Ok(Json(demands))
}

pub async fn get_demand(
    Extension(state): Extension<AppState>,
    Path(id): Path<DemandId>,
) -> MarketResult<Json<Demand>> {
    let demand = Demand::find_by_id(id, &state.db_pool)
        .await?
        .ok_or(MarketError::NotFound("Demand"))?;
    Ok(Json(demand))
}

pub async fn list_interests(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<DemandId>,
) -> MarketResult<Json<Vec<DemandInterest>>> {
    let interests = state.engagement.interests(id, user.member_id).await?;
    Ok(Json(interests))
}

/// POST /demands/:id/interest - 201 when interest was added, 200 when removed
pub async fn toggle_interest(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<DemandId>,
) -> MarketResult<(StatusCode, Json<InterestResponse>)> {
    let interested = state.engagement.toggle_interest(id, user.member_id).await?;
    let status = if interested {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(InterestResponse {
            demand_id: id,
            interested,
        }),
    ))
}

pub async fn dismiss_interest(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path((id, broker_id)): Path<(DemandId, MemberId)>,
) -> MarketResult<Json<Demand>> {
    let demand = state
        .engagement
        .dismiss_interest(id, user.member_id, broker_id)
        .await?;
    Ok(Json(demand))
}

pub async fn hire_broker(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path((id, broker_id)): Path<(DemandId, MemberId)>,
) -> MarketResult<Json<Demand>> {
    let demand = state.engagement.hire(id, user.member_id, broker_id).await?;
    Ok(Json(demand))
}

pub async fn unhire_broker(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path((id, broker_id)): Path<(DemandId, MemberId)>,
) -> MarketResult<Json<Demand>> {
    let demand = state
        .engagement
        .unhire(id, user.member_id, Some(broker_id))
        .await?;
    Ok(Json(demand))
}

pub async fn complete_demand(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path((id, broker_id)): Path<(DemandId, MemberId)>,
) -> MarketResult<Json<CompleteResponse>> {
    let demand = state
        .engagement
        .complete(id, user.member_id, broker_id)
        .await?;
    Ok(Json(CompleteResponse {
        message: "Demand completed and broker credited".to_string(),
        demand,
    }))
}
