use crate::domain::commission::BankDetails;
use crate::domain::referral::{Plan, SellerRef};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct SellersRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct Seller {
    pub seller_id: Uuid,
    pub token: String,
    pub email: String,
    pub name: String,
    pub total_commission_minor: i64,
    pub available_commission_minor: i64,
    pub bank_details: BankDetails,
    pub plan_type: Option<String>,
    pub agent_limit: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub registration_id: Uuid,
    pub transaction_id: Option<String>,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub shop_name: Option<String>,
}

fn row_to_seller(r: sqlx::postgres::PgRow) -> Seller {
    Seller {
        seller_id: r.get("seller_id"),
        token: r.get("token"),
        email: r.get("email"),
        name: r.get("name"),
        total_commission_minor: r.get("total_commission_minor"),
        available_commission_minor: r.get("available_commission_minor"),
        bank_details: BankDetails {
            account_holder: r.get("bank_account_holder"),
            account_number: r.get("bank_account_number"),
            ifsc_code: r.get("bank_ifsc_code"),
            bank_name: r.get("bank_name"),
        },
        plan_type: r.get("plan_type"),
        agent_limit: r.get("agent_limit"),
    }
}

const SELLER_COLUMNS: &str = r#"
    seller_id, token, email, name, total_commission_minor, available_commission_minor,
    bank_account_holder, bank_account_number, bank_ifsc_code, bank_name,
    plan_type, agent_limit
"#;

impl SellersRepo {
    pub async fn find_by_token(&self, token: &str) -> Result<Option<SellerRef>> {
        let row = sqlx::query("SELECT seller_id, token FROM sellers WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| SellerRef {
            seller_id: r.get("seller_id"),
            token: r.get("token"),
        }))
    }

    pub async fn find_by_id(&self, seller_id: Uuid) -> Result<Option<Seller>> {
        let row = sqlx::query(&format!("SELECT {} FROM sellers WHERE seller_id = $1", SELLER_COLUMNS))
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(row_to_seller))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Seller>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sellers WHERE lower(email) = lower($1)",
            SELLER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_seller))
    }

    pub async fn add_commission(&self, seller_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sellers
            SET total_commission_minor = total_commission_minor + $2,
                available_commission_minor = available_commission_minor + $2
            WHERE seller_id = $1
            "#,
        )
        .bind(seller_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reverses a cancelled accrual from both running counters.
    pub async fn reverse_commission(&self, seller_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sellers
            SET total_commission_minor = total_commission_minor - $2,
                available_commission_minor = available_commission_minor - $2
            WHERE seller_id = $1
            "#,
        )
        .bind(seller_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Optimistic withdrawal debit. The balance check and the debit are one
    /// statement, so two racing withdrawal requests cannot both pass on the
    /// same rupees. Returns false when the balance is short.
    pub async fn try_debit_available(&self, seller_id: Uuid, amount_minor: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sellers
            SET available_commission_minor = available_commission_minor - $2
            WHERE seller_id = $1 AND available_commission_minor >= $2
            "#,
        )
        .bind(seller_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn refund_available(&self, seller_id: Uuid, amount_minor: i64) -> Result<()> {
        sqlx::query(
            "UPDATE sellers SET available_commission_minor = available_commission_minor + $2 WHERE seller_id = $1",
        )
        .bind(seller_id)
        .bind(amount_minor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn upgrade_plan(&self, seller_id: Uuid, plan: Plan) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sellers
            SET plan_type = $2, agent_limit = $3, plan_activated_at = now()
            WHERE seller_id = $1
            "#,
        )
        .bind(seller_id)
        .bind(plan.plan_type.as_str())
        .bind(plan.agent_limit)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_pending_registration(
        &self,
        transaction_id: &str,
        email: &str,
    ) -> Result<Option<PendingRegistration>> {
        let row = sqlx::query(
            r#"
            SELECT registration_id, transaction_id, email, name, phone, shop_name
            FROM seller_registrations
            WHERE transaction_id = $1 OR lower(email) = lower($2)
            ORDER BY (transaction_id = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(transaction_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PendingRegistration {
            registration_id: r.get("registration_id"),
            transaction_id: r.get("transaction_id"),
            email: r.get("email"),
            name: r.get("name"),
            phone: r.get("phone"),
            shop_name: r.get("shop_name"),
        }))
    }

    /// Promotes a pending registration to an active seller and removes the
    /// registration. The generated token is the seller's referral handle.
    pub async fn promote_registration(
        &self,
        registration: &PendingRegistration,
        plan: Plan,
    ) -> Result<Uuid> {
        let seller_id = Uuid::new_v4();
        let token = format!("SLR{}", &seller_id.simple().to_string()[..10].to_uppercase());

        sqlx::query(
            r#"
            INSERT INTO sellers (seller_id, token, email, name, phone, shop_name, plan_type, agent_limit, plan_activated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            "#,
        )
        .bind(seller_id)
        .bind(&token)
        .bind(&registration.email)
        .bind(&registration.name)
        .bind(&registration.phone)
        .bind(&registration.shop_name)
        .bind(plan.plan_type.as_str())
        .bind(plan.agent_limit)
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM seller_registrations WHERE registration_id = $1")
            .bind(registration.registration_id)
            .execute(&self.pool)
            .await?;

        Ok(seller_id)
    }
}
