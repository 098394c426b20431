use axum::{
    extract::{Extension, Path, Query},
    Json,
};

use crate::common::{MarketError, MarketResult, MemberId, PageParams};
use crate::domains::members::Member;
use crate::domains::reviews::Review;
use crate::server::app::AppState;

/// Public profile, including reputation points.
pub async fn get_member(
    Extension(state): Extension<AppState>,
    Path(id): Path<MemberId>,
) -> MarketResult<Json<Member>> {
    let member = Member::find_by_id(id, &state.db_pool)
        .await?
        .ok_or(MarketError::NotFound("Member"))?;
    Ok(Json(member))
}

pub async fn member_reviews(
    Extension(state): Extension<AppState>,
    Path(id): Path<MemberId>,
    Query(page): Query<PageParams>,
) -> MarketResult<Json<Vec<Review>>> {
    let reviews = state.reviews.reviews_for(id, page.validate()).await?;
    Ok(Json(reviews))
}
