use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct SettingsRepo {
    pub pool: PgPool,
}

pub const SELLER_COMMISSION_RATE_KEY: &str = "seller_commission_rate";
pub const AGENT_COMMISSION_RATE_KEY: &str = "agent_commission_rate";
pub const WITHDRAWAL_FEE_RATE_KEY: &str = "withdrawal_fee_rate";
pub const COD_UPFRONT_AMOUNT_KEY: &str = "cod_upfront_amount_minor";

pub const DEFAULT_SELLER_COMMISSION_RATE: f64 = 30.0;
pub const DEFAULT_AGENT_COMMISSION_RATE: f64 = 10.0;
pub const DEFAULT_WITHDRAWAL_FEE_RATE: f64 = 0.0;
pub const DEFAULT_COD_UPFRONT_MINOR: i64 = 0;

impl SettingsRepo {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    pub async fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default))
    }

    pub async fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default))
    }

    pub async fn seller_commission_rate(&self) -> Result<f64> {
        self.get_f64(SELLER_COMMISSION_RATE_KEY, DEFAULT_SELLER_COMMISSION_RATE)
            .await
    }

    pub async fn agent_commission_rate(&self) -> Result<f64> {
        self.get_f64(AGENT_COMMISSION_RATE_KEY, DEFAULT_AGENT_COMMISSION_RATE)
            .await
    }

    pub async fn withdrawal_fee_rate(&self) -> Result<f64> {
        self.get_f64(WITHDRAWAL_FEE_RATE_KEY, DEFAULT_WITHDRAWAL_FEE_RATE)
            .await
    }

    pub async fn cod_upfront_amount_minor(&self) -> Result<i64> {
        self.get_i64(COD_UPFRONT_AMOUNT_KEY, DEFAULT_COD_UPFRONT_MINOR)
            .await
    }
}
