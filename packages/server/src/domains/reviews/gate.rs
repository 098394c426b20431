use sqlx::PgPool;
use std::sync::Arc;

use super::actions::{self, SubmitReview};
use super::models::Review;
use crate::common::{MarketResult, MemberId, Page};
use crate::kernel::{BaseRealtimeDispatcher, Outbox};

/// Review Gate - at most one review per reviewer per completed deal.
#[derive(Clone)]
pub struct ReviewGate {
    pool: PgPool,
    dispatcher: Arc<dyn BaseRealtimeDispatcher>,
}

impl ReviewGate {
    pub fn new(pool: PgPool, dispatcher: Arc<dyn BaseRealtimeDispatcher>) -> Self {
        Self { pool, dispatcher }
    }

    pub async fn submit_review(&self, input: SubmitReview) -> MarketResult<Review> {
        let mut outbox = Outbox::new();
        let mut tx = self.pool.begin().await?;

        let review = actions::submit_review(input, &mut tx, &mut outbox).await?;

        tx.commit().await?;
        outbox.deliver(&self.dispatcher).await;
        Ok(review)
    }

    pub async fn reviews_for(&self, member_id: MemberId, page: Page) -> MarketResult<Vec<Review>> {
        Ok(Review::find_for_reviewee(member_id, page, &self.pool).await?)
    }
}
