use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{DemandId, MemberId};

/// A broker's standing interest in a demand. One row per (demand, broker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DemandInterest {
    pub demand_id: DemandId,
    pub broker_id: MemberId,
    pub created_at: DateTime<Utc>,
}

impl DemandInterest {
    /// Returns true when a row was inserted, false if it already existed.
    pub async fn insert_if_absent(
        demand_id: DemandId,
        broker_id: MemberId,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO demand_interests (demand_id, broker_id)
            VALUES ($1, $2)
            ON CONFLICT (demand_id, broker_id) DO NOTHING
            "#,
        )
        .bind(demand_id)
        .bind(broker_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Returns true when a row was removed.
    pub async fn delete(
        demand_id: DemandId,
        broker_id: MemberId,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM demand_interests WHERE demand_id = $1 AND broker_id = $2")
                .bind(demand_id)
                .bind(broker_id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn exists(
        demand_id: DemandId,
        broker_id: MemberId,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM demand_interests WHERE demand_id = $1 AND broker_id = $2
            )
            "#,
        )
        .bind(demand_id)
        .bind(broker_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Fan-out recipient set, read inside the mutating transaction.
    pub async fn broker_ids_for_demand(
        demand_id: DemandId,
        conn: &mut PgConnection,
    ) -> Result<Vec<MemberId>> {
        let ids = sqlx::query_scalar::<_, MemberId>(
            "SELECT broker_id FROM demand_interests WHERE demand_id = $1 ORDER BY created_at ASC",
        )
        .bind(demand_id)
        .fetch_all(conn)
        .await?;
        Ok(ids)
    }

    pub async fn find_for_demand(demand_id: DemandId, pool: &PgPool) -> Result<Vec<Self>> {
        let interests = sqlx::query_as::<_, DemandInterest>(
            "SELECT * FROM demand_interests WHERE demand_id = $1 ORDER BY created_at ASC",
        )
        .bind(demand_id)
        .fetch_all(pool)
        .await?;
        Ok(interests)
    }
}
