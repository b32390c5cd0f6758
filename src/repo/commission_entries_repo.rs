use crate::domain::commission::{CommissionEntry, CommissionStatus, CommissionType};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommissionEntriesRepo {
    pub pool: PgPool,
}

pub struct NewEntry {
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub entry_type: CommissionType,
    pub amount_minor: i64,
    pub status: CommissionStatus,
    pub order_snapshot: Option<serde_json::Value>,
}

fn row_to_entry(r: sqlx::postgres::PgRow) -> CommissionEntry {
    let entry_type: String = r.get("entry_type");
    let status: String = r.get("status");
    CommissionEntry {
        entry_id: r.get("entry_id"),
        seller_id: r.get("seller_id"),
        agent_id: r.get("agent_id"),
        order_id: r.get("order_id"),
        entry_type: match entry_type.as_str() {
            "BONUS" => CommissionType::Bonus,
            "DEDUCTED" => CommissionType::Deducted,
            "WITHDRAWN" => CommissionType::Withdrawn,
            _ => CommissionType::Earned,
        },
        amount_minor: r.get("amount_minor"),
        status: CommissionStatus::parse(&status),
        order_snapshot: r.get("order_snapshot"),
        created_at: r.get("created_at"),
    }
}

impl CommissionEntriesRepo {
    pub async fn insert(&self, entry: &NewEntry) -> Result<Uuid> {
        let entry_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO commission_entries (
                entry_id, seller_id, agent_id, order_id, entry_type, amount_minor, status, order_snapshot
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry_id)
        .bind(entry.seller_id)
        .bind(entry.agent_id)
        .bind(entry.order_id)
        .bind(entry.entry_type.as_str())
        .bind(entry.amount_minor)
        .bind(entry.status.as_str())
        .bind(&entry.order_snapshot)
        .execute(&self.pool)
        .await?;

        Ok(entry_id)
    }

    pub async fn find(&self, entry_id: Uuid) -> Result<Option<CommissionEntry>> {
        let row = sqlx::query(
            r#"
            SELECT entry_id, seller_id, agent_id, order_id, entry_type, amount_minor, status,
                   order_snapshot, created_at
            FROM commission_entries WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_entry))
    }

    /// Status transition guarded at the storage layer: only a PENDING entry
    /// moves. Returns false when the entry was not pending (or missing).
    pub async fn try_transition(
        &self,
        entry_id: Uuid,
        to: CommissionStatus,
        processed_by: &str,
        reason: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE commission_entries
            SET status = $2, processed_by = $3, cancel_reason = $4, processed_at = now()
            WHERE entry_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(entry_id)
        .bind(to.as_str())
        .bind(processed_by)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
