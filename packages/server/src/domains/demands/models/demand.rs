use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{DemandId, MemberId, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "demand_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    Active,
    Completed,
}

impl std::fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandStatus::Active => write!(f, "active"),
            DemandStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Demand - a trader's request that brokers compete to fulfil
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Demand {
    pub id: DemandId,
    pub trader_id: MemberId,
    pub title: String,
    pub details: serde_json::Value,
    pub status: DemandStatus,
    pub hired_broker_id: Option<MemberId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Demand {
    pub fn is_active(&self) -> bool {
        self.status == DemandStatus::Active
    }

    /// Still accepting broker interest: active with nobody hired.
    pub fn is_open(&self) -> bool {
        self.is_active() && self.hired_broker_id.is_none()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Demand {
    pub async fn create(
        trader_id: MemberId,
        title: &str,
        details: &serde_json::Value,
        pool: &PgPool,
    ) -> Result<Self> {
        let demand = sqlx::query_as::<_, Demand>(
            r#"
            INSERT INTO demands (id, trader_id, title, details)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(DemandId::new())
        .bind(trader_id)
        .bind(title)
        .bind(details)
        .fetch_one(pool)
        .await?;
        Ok(demand)
    }

    pub async fn find_by_id(id: DemandId, pool: &PgPool) -> Result<Option<Self>> {
        let demand = sqlx::query_as::<_, Demand>("SELECT * FROM demands WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(demand)
    }

    /// Lock the demand row; every engagement guard reads through this.
    pub async fn find_for_update(id: DemandId, conn: &mut PgConnection) -> Result<Option<Self>> {
        let demand = sqlx::query_as::<_, Demand>("SELECT * FROM demands WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(demand)
    }

    /// Active demands, newest first
    pub async fn find_active(page: Page, pool: &PgPool) -> Result<Vec<Self>> {
        let demands = sqlx::query_as::<_, Demand>(
            r#"
            SELECT * FROM demands
            WHERE status = 'active'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;
        Ok(demands)
    }

    /// Set or clear the hired broker.
    pub async fn set_hired_broker(
        id: DemandId,
        broker_id: Option<MemberId>,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let demand = sqlx::query_as::<_, Demand>(
            r#"
            UPDATE demands
            SET hired_broker_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(broker_id)
        .fetch_one(conn)
        .await?;
        Ok(demand)
    }

    pub async fn mark_completed(id: DemandId, conn: &mut PgConnection) -> Result<Self> {
        let demand = sqlx::query_as::<_, Demand>(
            r#"
            UPDATE demands
            SET status = 'completed', completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await?;
        Ok(demand)
    }
}
