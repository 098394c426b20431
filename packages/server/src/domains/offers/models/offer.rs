use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ListingId, MemberId, OfferId, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    PendingSeller,
    PendingBuyer,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Accepted | OfferStatus::Rejected)
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferStatus::PendingSeller => write!(f, "pending_seller"),
            OfferStatus::PendingBuyer => write!(f, "pending_buyer"),
            OfferStatus::Accepted => write!(f, "accepted"),
            OfferStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Offer - one negotiation between a buyer and a listing's seller
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: OfferId,
    pub listing_id: ListingId,
    pub buyer_id: MemberId,
    pub seller_id: MemberId,
    pub price: Decimal,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn is_party(&self, member_id: MemberId) -> bool {
        self.buyer_id == member_id || self.seller_id == member_id
    }

    /// The other side of the negotiation from `member_id`'s point of view.
    pub fn counterparty_of(&self, member_id: MemberId) -> MemberId {
        if member_id == self.buyer_id {
            self.seller_id
        } else {
            self.buyer_id
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Offer {
    /// Insert a new offer in `pending_seller`.
    pub async fn create(
        listing_id: ListingId,
        buyer_id: MemberId,
        seller_id: MemberId,
        price: Decimal,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (id, listing_id, buyer_id, seller_id, price, status)
            VALUES ($1, $2, $3, $4, $5, 'pending_seller')
            RETURNING *
            "#,
        )
        .bind(OfferId::new())
        .bind(listing_id)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(price)
        .fetch_one(conn)
        .await?;
        Ok(offer)
    }

    pub async fn find_by_id(id: OfferId, pool: &PgPool) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(offer)
    }

    /// Unlocked read inside a transaction, used to learn the listing id
    /// before taking locks in listing-then-offer order.
    pub async fn find_by_id_in(id: OfferId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(offer)
    }

    /// Lock the offer row for the rest of the transaction. A concurrent
    /// responder blocks here and then reads the committed state.
    pub async fn find_for_update(id: OfferId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(offer)
    }

    /// Write a state-machine transition. Only the negotiation actions call this.
    pub async fn apply_transition(
        id: OfferId,
        status: OfferStatus,
        price: Decimal,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = $2, price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(price)
        .fetch_one(conn)
        .await?;
        Ok(offer)
    }

    /// Force every other still-pending offer on the listing to `rejected`.
    /// Returns the offers that were closed.
    pub async fn reject_pending_siblings(
        listing_id: ListingId,
        accepted_id: OfferId,
        conn: &mut PgConnection,
    ) -> Result<Vec<Self>> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers
            SET status = 'rejected', updated_at = NOW()
            WHERE listing_id = $1
              AND id <> $2
              AND status IN ('pending_seller', 'pending_buyer')
            RETURNING *
            "#,
        )
        .bind(listing_id)
        .bind(accepted_id)
        .fetch_all(conn)
        .await?;
        Ok(offers)
    }

    pub async fn find_by_listing(listing_id: ListingId, pool: &PgPool) -> Result<Vec<Self>> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT * FROM offers WHERE listing_id = $1 ORDER BY created_at ASC",
        )
        .bind(listing_id)
        .fetch_all(pool)
        .await?;
        Ok(offers)
    }

    /// Offers where the member is buyer or seller, most recently touched first
    pub async fn find_for_member(
        member_id: MemberId,
        page: Page,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE buyer_id = $1 OR seller_id = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(member_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
        Ok(offers)
    }
}
