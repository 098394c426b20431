use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::common::{ListingId, MarketResult, OfferId, PageParams};
use crate::domains::offers::{Offer, OfferAction};
use crate::server::app::AppState;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub offer_price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub response_type: String,
    pub new_price: Option<Decimal>,
}

/// POST /offers/:listing_id
pub async fn create_offer(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(listing_id): Path<ListingId>,
    ApiJson(body): ApiJson<CreateOfferRequest>,
) -> MarketResult<(StatusCode, Json<Offer>)> {
    let offer = state
        .negotiation
        .create_offer(listing_id, user.member_id, body.offer_price)
        .await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// PUT /offers/:offer_id/respond
pub async fn respond_to_offer(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(offer_id): Path<OfferId>,
    ApiJson(body): ApiJson<RespondRequest>,
) -> MarketResult<Json<Offer>> {
    let action = OfferAction::parse(&body.response_type, body.new_price)?;
    let offer = state
        .negotiation
        .respond(offer_id, user.member_id, action)
        .await?;
    Ok(Json(offer))
}

/// Offers the caller is buying or selling in.
pub async fn my_offers(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(page): Query<PageParams>,
) -> MarketResult<Json<Vec<Offer>>> {
    let offers = state
        .negotiation
        .offers_for_member(user.member_id, page.validate())
        .await?;
    Ok(Json(offers))
}

pub async fn get_offer(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(offer_id): Path<OfferId>,
) -> MarketResult<Json<Offer>> {
    let offer = state.negotiation.offer(offer_id, user.member_id).await?;
    Ok(Json(offer))
}
