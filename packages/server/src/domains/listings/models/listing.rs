use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ListingId, MemberId, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    Sold,
}

/// Listing - a physical item offered for sale by its seller
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: MemberId,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Listing {
    pub async fn create(
        seller_id: MemberId,
        title: &str,
        description: Option<&str>,
        price: Decimal,
        pool: &PgPool,
    ) -> Result<Self> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (id, seller_id, title, description, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ListingId::new())
        .bind(seller_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .fetch_one(pool)
        .await?;
        Ok(listing)
    }

    pub async fn find_by_id(id: ListingId, pool: &PgPool) -> Result<Option<Self>> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(listing)
    }

    /// Available listings, newest first
    pub async fn find_available(page: Page, pool: &PgPool) -> Result<Vec<Self>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT * FROM listings
            WHERE status = 'available'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
        Ok(listings)
    }

    /// Share-lock the listing row for the rest of the transaction.
    ///
    /// Offer creation holds this so an accept (which takes `FOR UPDATE`)
    /// either runs entirely before or entirely after it.
    pub async fn find_for_share(id: ListingId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let listing =
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1 FOR SHARE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(listing)
    }

    /// Exclusively lock the listing row for the rest of the transaction.
    pub async fn find_for_update(id: ListingId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let listing =
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(listing)
    }

    /// Conditional `available -> sold`. Returns false when the listing was
    /// already sold, in which case nothing was written.
    pub async fn mark_sold_if_available(id: ListingId, conn: &mut PgConnection) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET status = 'sold', updated_at = NOW()
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
