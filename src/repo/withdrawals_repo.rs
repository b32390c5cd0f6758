use crate::domain::commission::{BankDetails, Withdrawal, WithdrawalSource, WithdrawalStatus};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// One repo over two generations of withdrawal storage. New requests always
/// land in `withdrawals`; lookups fall back to `legacy_withdrawals` so admin
/// tooling keeps working on records created before the schema change.
/// Callers only ever see the unified `Withdrawal` struct.
#[derive(Clone)]
pub struct WithdrawalsRepo {
    pub pool: PgPool,
}

pub struct NewWithdrawal {
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub amount_minor: i64,
    pub net_amount_minor: i64,
    pub bank_details: BankDetails,
    pub commission_entry_id: Option<Uuid>,
}

fn row_to_withdrawal(r: sqlx::postgres::PgRow, source: WithdrawalSource) -> Withdrawal {
    let status: String = r.get("status");
    Withdrawal {
        withdrawal_id: r.get("withdrawal_id"),
        source,
        seller_id: r.get("seller_id"),
        agent_id: r.get("agent_id"),
        amount_minor: r.get("amount_minor"),
        net_amount_minor: r.get("net_amount_minor"),
        status: WithdrawalStatus::parse(&status),
        bank_details: BankDetails {
            account_holder: r.get("bank_account_holder"),
            account_number: r.get("bank_account_number"),
            ifsc_code: r.get("bank_ifsc_code"),
            bank_name: r.get("bank_name"),
        },
        commission_entry_id: r.get("commission_entry_id"),
        processed_by: r.get("processed_by"),
        processed_at: r.get("processed_at"),
        created_at: r.get("created_at"),
    }
}

const CURRENT_COLUMNS: &str = r#"
    withdrawal_id, seller_id, agent_id, amount_minor, net_amount_minor, status,
    bank_account_holder, bank_account_number, bank_ifsc_code, bank_name,
    commission_entry_id, processed_by, processed_at, created_at
"#;

// The legacy table predates agent withdrawals and the ledger link; missing
// columns are projected as NULL so both shapes map to the same struct.
const LEGACY_COLUMNS: &str = r#"
    withdrawal_id, seller_id, NULL::uuid AS agent_id, amount_minor,
    amount_minor AS net_amount_minor, status,
    bank_account_holder, bank_account_number, bank_ifsc_code, bank_name,
    NULL::uuid AS commission_entry_id, processed_by, processed_at, created_at
"#;

impl WithdrawalsRepo {
    pub async fn insert(&self, w: &NewWithdrawal) -> Result<Uuid> {
        let withdrawal_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO withdrawals (
                withdrawal_id, seller_id, agent_id, amount_minor, net_amount_minor, status,
                bank_account_holder, bank_account_number, bank_ifsc_code, bank_name,
                commission_entry_id
            ) VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7, $8, $9, $10)
            "#,
        )
        .bind(withdrawal_id)
        .bind(w.seller_id)
        .bind(w.agent_id)
        .bind(w.amount_minor)
        .bind(w.net_amount_minor)
        .bind(&w.bank_details.account_holder)
        .bind(&w.bank_details.account_number)
        .bind(&w.bank_details.ifsc_code)
        .bind(&w.bank_details.bank_name)
        .bind(w.commission_entry_id)
        .execute(&self.pool)
        .await?;

        Ok(withdrawal_id)
    }

    pub async fn find(&self, withdrawal_id: Uuid) -> Result<Option<Withdrawal>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM withdrawals WHERE withdrawal_id = $1",
            CURRENT_COLUMNS
        ))
        .bind(withdrawal_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row {
            return Ok(Some(row_to_withdrawal(r, WithdrawalSource::Current)));
        }

        let row = sqlx::query(&format!(
            "SELECT {} FROM legacy_withdrawals WHERE withdrawal_id = $1",
            LEGACY_COLUMNS
        ))
        .bind(withdrawal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_withdrawal(r, WithdrawalSource::Legacy)))
    }

    /// Guarded status transition against whichever table owns the record.
    /// Returns false when the row was no longer in `from`.
    pub async fn try_transition(
        &self,
        withdrawal_id: Uuid,
        source: WithdrawalSource,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
        processed_by: &str,
    ) -> Result<bool> {
        let table = match source {
            WithdrawalSource::Current => "withdrawals",
            WithdrawalSource::Legacy => "legacy_withdrawals",
        };
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET status = $2, processed_by = $3, processed_at = now()
            WHERE withdrawal_id = $1 AND status = $4
            "#,
            table
        ))
        .bind(withdrawal_id)
        .bind(to.as_str())
        .bind(processed_by)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
