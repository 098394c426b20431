use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::common::{validate_price, ListingId, MarketError, MarketResult, PageParams};
use crate::domains::listings::Listing;
use crate::domains::offers::Offer;
use crate::kernel::{PriceEstimate, PriceEstimateRequest};
use crate::server::app::AppState;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
}

pub async fn create_listing(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<CreateListingRequest>,
) -> MarketResult<(StatusCode, Json<Listing>)> {
    let price = validate_price(body.price)?;

    let listing = Listing::create(
        user.member_id,
        &body.title,
        body.description.as_deref(),
        price,
        &state.db_pool,
    )
    .await?;

    tracing::info!(listing_id = %listing.id, seller_id = %user.member_id, "Listing created");
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Available listings, newest first.
pub async fn list_listings(
    Extension(state): Extension<AppState>,
    Query(page): Query<PageParams>,
) -> MarketResult<Json<Vec<Listing>>> {
    let listings = Listing::find_available(page.validate(), &state.db_pool).await?;
    Ok(Json(listings))
}

pub async fn get_listing(
    Extension(state): Extension<AppState>,
    Path(id): Path<ListingId>,
) -> MarketResult<Json<Listing>> {
    let listing = Listing::find_by_id(id, &state.db_pool)
        .await?
        .ok_or(MarketError::NotFound("Listing"))?;
    Ok(Json(listing))
}

/// Every offer on a listing. Seller only.
pub async fn listing_offers(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<ListingId>,
) -> MarketResult<Json<Vec<Offer>>> {
    let offers = state
        .negotiation
        .offers_on_listing(id, user.member_id)
        .await?;
    Ok(Json(offers))
}

pub async fn estimate_price(
    Extension(state): Extension<AppState>,
    _user: AuthUser,
    ApiJson(body): ApiJson<PriceEstimateRequest>,
) -> MarketResult<Json<PriceEstimate>> {
    let oracle = state
        .price_oracle
        .as_ref()
        .ok_or(MarketError::OracleUnavailable)?;

    let estimate = oracle.estimate(&body).await.map_err(|e| {
        tracing::warn!(error = %e, "Price estimation failed");
        MarketError::OracleUnavailable
    })?;
    Ok(Json(estimate))
}
