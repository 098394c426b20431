use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;

use crate::common::{DemandId, MarketResult, MemberId, OfferId};
use crate::domains::reviews::{Review, ReviewTarget, SubmitReview};
use crate::server::app::AppState;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub offer_id: Option<OfferId>,
    pub demand_id: Option<DemandId>,
    pub reviewee_id: MemberId,
    pub rating: i32,
    pub review_text: Option<String>,
}

pub async fn submit_review(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<SubmitReviewRequest>,
) -> MarketResult<(StatusCode, Json<Review>)> {
    let target = ReviewTarget::from_parts(body.offer_id, body.demand_id)?;

    let review = state
        .reviews
        .submit_review(SubmitReview {
            reviewer_id: user.member_id,
            reviewee_id: body.reviewee_id,
            target,
            rating: body.rating,
            review_text: body.review_text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
