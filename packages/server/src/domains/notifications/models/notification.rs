use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{MemberId, NotificationId, Page};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: MemberId,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Notification {
    /// Append a ledger row inside the caller's transaction. Rolled back with
    /// the business change if the transaction does not commit.
    pub async fn append(
        recipient_id: MemberId,
        message: &str,
        link: Option<&str>,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, message, link)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(recipient_id)
        .bind(message)
        .bind(link)
        .fetch_one(conn)
        .await?;
        Ok(notification)
    }

    /// Newest first
    pub async fn find_for_recipient(
        recipient_id: MemberId,
        page: Page,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recipient_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
        Ok(notifications)
    }

    pub async fn unread_count(recipient_id: MemberId, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification read. None if it doesn't exist or belongs to
    /// someone else.
    pub async fn mark_read(
        id: NotificationId,
        recipient_id: MemberId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await?;
        Ok(notification)
    }

    /// Returns the number of rows flipped.
    pub async fn mark_all_read(recipient_id: MemberId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
