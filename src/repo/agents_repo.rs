use crate::domain::commission::BankDetails;
use crate::domain::referral::AgentRef;
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct AgentsRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub agent_id: Uuid,
    pub code: String,
    pub email: String,
    pub total_commission_minor: i64,
    pub available_commission_minor: i64,
    pub bank_details: BankDetails,
}

impl AgentsRepo {
    /// Personal codes are matched case-insensitively; agents hand them out
    /// verbally and casing drifts.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<AgentRef>> {
        let row = sqlx::query(
            "SELECT agent_id, code, linked_seller_id FROM agents WHERE lower(code) = lower($1)",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AgentRef {
            agent_id: r.get("agent_id"),
            code: r.get("code"),
            linked_seller_id: r.get("linked_seller_id"),
        }))
    }

    pub async fn find_by_id(&self, agent_id: Uuid) -> Result<Option<Agent>> {
        let row = sqlx::query(
            r#"
            SELECT agent_id, code, email, total_commission_minor, available_commission_minor,
                   bank_account_holder, bank_account_number, bank_ifsc_code, bank_name
            FROM agents WHERE agent_id = $1
            "#,
        )
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Agent {
            agent_id: r.get("agent_id"),
            code: r.get("code"),
            email: r.get("email"),
            total_commission_minor: r.get("total_commission_minor"),
            available_commission_minor: r.get("available_commission_minor"),
            bank_details: BankDetails {
                account_holder: r.get("bank_account_holder"),
                account_number: r.get("bank_account_number"),
                ifsc_code: r.get("bank_ifsc_code"),
                bank_name: r.get("bank_name"),
            },
        }))
    }

    pub async fn add_commission(&self, agent_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE agents
            SET total_commission_minor = total_commission_minor + $2,
                available_commission_minor = available_commission_minor + $2
            WHERE agent_id = $1
            "#,
        )
        .bind(agent_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn reverse_commission(&self, agent_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE agents
            SET total_commission_minor = total_commission_minor - $2,
                available_commission_minor = available_commission_minor - $2
            WHERE agent_id = $1
            "#,
        )
        .bind(agent_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn try_debit_available(&self, agent_id: Uuid, amount_minor: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE agents
            SET available_commission_minor = available_commission_minor - $2
            WHERE agent_id = $1 AND available_commission_minor >= $2
            "#,
        )
        .bind(agent_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn refund_available(&self, agent_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            "UPDATE agents SET available_commission_minor = available_commission_minor + $2 WHERE agent_id = $1",
        )
        .bind(agent_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
