use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod mock;
pub mod phonepe;
pub mod razorpay;

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub merchant_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    /// Internal order id, echoed back through gateway metadata so callbacks
    /// can recover the record even if the transaction id mapping is ambiguous.
    pub order_id: Uuid,
    pub redirect_url: String,
    pub callback_url: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteOrder {
    pub remote_order_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteOrderState {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteOrderStatus {
    pub state: RemoteOrderState,
    pub raw_state: String,
    pub amount_minor: Option<i64>,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundResult {
    pub refund_id: String,
    pub remote_refund_id: Option<String>,
    pub accepted: bool,
}

/// Contract every payment provider adapter satisfies. Amounts are integer
/// minor units throughout; adapters never see decimal rupees.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<RemoteOrder>;

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus>;

    async fn issue_refund(
        &self,
        refund_id: &str,
        original_order_id: &str,
        amount_minor: i64,
    ) -> Result<RefundResult>;
}
