use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{DemandId, MarketError, MarketResult, MemberId, OfferId, Page, ReviewId};
use crate::kernel::db::is_unique_violation;

/// The deal a review is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewTarget {
    Offer(OfferId),
    Demand(DemandId),
}

impl ReviewTarget {
    /// Exactly one of the two ids must be present.
    pub fn from_parts(offer_id: Option<OfferId>, demand_id: Option<DemandId>) -> MarketResult<Self> {
        match (offer_id, demand_id) {
            (Some(offer_id), None) => Ok(ReviewTarget::Offer(offer_id)),
            (None, Some(demand_id)) => Ok(ReviewTarget::Demand(demand_id)),
            _ => Err(MarketError::InvalidReviewTarget),
        }
    }

    fn offer_id(&self) -> Option<OfferId> {
        match self {
            ReviewTarget::Offer(id) => Some(*id),
            ReviewTarget::Demand(_) => None,
        }
    }

    fn demand_id(&self) -> Option<DemandId> {
        match self {
            ReviewTarget::Demand(id) => Some(*id),
            ReviewTarget::Offer(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub reviewer_id: MemberId,
    pub reviewee_id: MemberId,
    pub offer_id: Option<OfferId>,
    pub demand_id: Option<DemandId>,
    pub rating: i16,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Review {
    /// Has `reviewer_id` already reviewed this deal?
    pub async fn exists_for(
        reviewer_id: MemberId,
        target: ReviewTarget,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reviews
                WHERE reviewer_id = $1
                  AND (offer_id = $2 OR demand_id = $3)
            )
            "#,
        )
        .bind(reviewer_id)
        .bind(target.offer_id())
        .bind(target.demand_id())
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Insert a review. Returns `None` if the unique index rejected it as a
    /// duplicate.
    pub async fn create(
        reviewer_id: MemberId,
        reviewee_id: MemberId,
        target: ReviewTarget,
        rating: i16,
        review_text: Option<&str>,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        let result = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, reviewer_id, reviewee_id, offer_id, demand_id, rating, review_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ReviewId::new())
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(target.offer_id())
        .bind(target.demand_id())
        .bind(rating)
        .bind(review_text)
        .fetch_one(conn)
        .await;

        match result {
            Ok(review) => Ok(Some(review)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reviews a member has received, newest first
    pub async fn find_for_reviewee(
        reviewee_id: MemberId,
        page: Page,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(reviewee_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }
}
