use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Trader,
    Broker,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub role: MemberRole,
    pub reputation_points: i32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Member {
    /// Provision a member row. The auth service owns identity; this mirrors
    /// its id locally.
    pub async fn create(
        id: MemberId,
        display_name: &str,
        role: MemberRole,
        pool: &PgPool,
    ) -> Result<Self> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (id, display_name, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(role)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    /// Same as `find_by_id`, inside an open transaction.
    pub async fn find_by_id_in(id: MemberId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(member)
    }

    /// Atomically add reputation points. A single UPDATE, so concurrent
    /// completions never lose an increment. Returns the new total.
    pub async fn add_reputation(
        id: MemberId,
        points: i32,
        conn: &mut PgConnection,
    ) -> Result<Option<i32>> {
        let total = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE members
            SET reputation_points = reputation_points + $2
            WHERE id = $1
            RETURNING reputation_points
            "#,
        )
        .bind(id)
        .bind(points)
        .fetch_optional(conn)
        .await?;
        Ok(total)
    }
}
