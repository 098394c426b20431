//! Submit review action - one review per reviewer per completed deal

use sqlx::PgConnection;
use tracing::info;

use crate::common::{MarketError, MarketResult, MemberId};
use crate::domains::demands::Demand;
use crate::domains::notifications::Notification;
use crate::domains::offers::Offer;
use crate::domains::reviews::eligibility::{validate_rating, Deal};
use crate::domains::reviews::models::{Review, ReviewTarget};
use crate::kernel::{EventKind, Outbox};

#[derive(Debug, Clone)]
pub struct SubmitReview {
    pub reviewer_id: MemberId,
    pub reviewee_id: MemberId,
    pub target: ReviewTarget,
    pub rating: i32,
    pub review_text: Option<String>,
}

/// The deal row is locked first, so two submissions by the same reviewer
/// serialize and the second sees the first in the existence check.
pub async fn submit_review(
    input: SubmitReview,
    conn: &mut PgConnection,
    outbox: &mut Outbox,
) -> MarketResult<Review> {
    let rating = validate_rating(input.rating)?;

    let deal = match input.target {
        ReviewTarget::Offer(offer_id) => Offer::find_for_update(offer_id, &mut *conn)
            .await?
            .map(|offer| Deal::from_offer(&offer))
            .ok_or(MarketError::NotFound("Offer"))?,
        ReviewTarget::Demand(demand_id) => Demand::find_for_update(demand_id, &mut *conn)
            .await?
            .map(|demand| Deal::from_demand(&demand))
            .ok_or(MarketError::NotFound("Demand"))?,
    };

    deal.check_review(input.reviewer_id, input.reviewee_id)?;

    if Review::exists_for(input.reviewer_id, input.target, &mut *conn).await? {
        return Err(MarketError::DuplicateReview);
    }

    let review = Review::create(
        input.reviewer_id,
        input.reviewee_id,
        input.target,
        rating,
        input.review_text.as_deref(),
        &mut *conn,
    )
    .await?
    .ok_or(MarketError::DuplicateReview)?;

    let notification = Notification::append(
        review.reviewee_id,
        &format!("You received a {}-star review", review.rating),
        Some(&format!("/members/{}/reviews", review.reviewee_id)),
        &mut *conn,
    )
    .await?;

    outbox.emit(review.reviewee_id, EventKind::ReviewReceived, &review)?;
    outbox.notification(&notification)?;

    info!(
        review_id = %review.id,
        reviewer_id = %review.reviewer_id,
        reviewee_id = %review.reviewee_id,
        rating = review.rating,
        "Review submitted"
    );

    Ok(review)
}
