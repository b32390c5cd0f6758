use crate::gateways::{
    CreateOrderRequest, PaymentGateway, RefundResult, RemoteOrder, RemoteOrderState,
    RemoteOrderStatus,
};
use anyhow::{anyhow, Result};

/// Scripted gateway for local development and tests. Behavior strings:
/// "ALWAYS_FAIL_CREATE", "STATUS_COMPLETED", "STATUS_FAILED", anything else
/// creates successfully and reports pending.
pub struct MockGateway {
    pub behavior: String,
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<RemoteOrder> {
        if self.behavior == "ALWAYS_FAIL_CREATE" {
            return Err(anyhow!("mock gateway declined order creation"));
        }
        Ok(RemoteOrder {
            remote_order_id: request.merchant_order_id.clone(),
            redirect_url: format!("https://mock.example/pay/{}", request.merchant_order_id),
        })
    }

    async fn order_status(&self, _remote_order_id: &str) -> Result<RemoteOrderStatus> {
        let (state, raw) = match self.behavior.as_str() {
            "STATUS_COMPLETED" => (RemoteOrderState::Completed, "COMPLETED"),
            "STATUS_FAILED" => (RemoteOrderState::Failed, "FAILED"),
            _ => (RemoteOrderState::Pending, "PENDING"),
        };
        Ok(RemoteOrderStatus {
            state,
            raw_state: raw.to_string(),
            amount_minor: None,
            error_code: None,
        })
    }

    async fn issue_refund(
        &self,
        refund_id: &str,
        _original_order_id: &str,
        _amount_minor: i64,
    ) -> Result<RefundResult> {
        Ok(RefundResult {
            refund_id: refund_id.to_string(),
            remote_refund_id: Some(format!("mock_rfnd_{}", refund_id)),
            accepted: true,
        })
    }
}
