use crate::gateways::{
    CreateOrderRequest, PaymentGateway, RefundResult, RemoteOrder, RemoteOrderState,
    RemoteOrderStatus,
};
use anyhow::{anyhow, Context, Result};
use serde_json::json;

pub struct RazorpayGateway {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub checkout_page_url: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

impl RazorpayGateway {
    fn normalize_payment_states(payments: &[serde_json::Value]) -> (RemoteOrderState, String) {
        let mut saw_payment = false;
        let mut all_failed = true;
        let mut last_raw = "created".to_string();
        for p in payments {
            let status = p.get("status").and_then(|s| s.as_str()).unwrap_or("created");
            last_raw = status.to_string();
            saw_payment = true;
            if status == "captured" {
                return (RemoteOrderState::Completed, last_raw);
            }
            if status != "failed" {
                all_failed = false;
            }
        }
        if saw_payment && all_failed {
            (RemoteOrderState::Failed, last_raw)
        } else {
            (RemoteOrderState::Pending, last_raw)
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<RemoteOrder> {
        let url = format!("{}/v1/orders", self.base_url);
        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "receipt": request.merchant_order_id,
            "payment_capture": 1,
            "notes": {
                "order_id": request.order_id.to_string(),
            }
        });

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("razorpay order request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "razorpay order create returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            ));
        }

        let v: serde_json::Value = resp.json().await.context("razorpay order response not json")?;
        let remote_order_id = v
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| anyhow!("razorpay order response missing id"))?
            .to_string();

        // Razorpay has no hosted redirect of its own here; the storefront
        // checkout page opens the widget with this order id.
        let redirect_url = format!("{}?order_id={}", self.checkout_page_url, remote_order_id);
        Ok(RemoteOrder {
            remote_order_id,
            redirect_url,
        })
    }

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus> {
        let url = format!("{}/v1/orders/{}/payments", self.base_url, remote_order_id);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("razorpay payments request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("razorpay payments returned {}", resp.status()));
        }

        let v: serde_json::Value = resp.json().await.context("razorpay payments response not json")?;
        let empty = Vec::new();
        let payments = v.get("items").and_then(|i| i.as_array()).unwrap_or(&empty);
        let (state, raw_state) = Self::normalize_payment_states(payments);
        let amount_minor = payments
            .iter()
            .find(|p| p.get("status").and_then(|s| s.as_str()) == Some("captured"))
            .and_then(|p| p.get("amount").and_then(|a| a.as_i64()));
        let error_code = payments
            .last()
            .and_then(|p| p.get("error_code").and_then(|e| e.as_str()))
            .map(ToString::to_string);

        Ok(RemoteOrderStatus {
            state,
            raw_state,
            amount_minor,
            error_code,
        })
    }

    async fn issue_refund(
        &self,
        refund_id: &str,
        original_order_id: &str,
        amount_minor: i64,
    ) -> Result<RefundResult> {
        // original_order_id here is the captured payment id; refunds are
        // idempotent through the idempotency header keyed by refund_id.
        let url = format!("{}/v1/payments/{}/refund", self.base_url, original_order_id);
        let body = json!({
            "amount": amount_minor,
            "notes": { "refund_id": refund_id },
        });

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .header("X-Razorpay-Idempotency", refund_id)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("razorpay refund request failed")?;

        let accepted = resp.status().is_success();
        let v: serde_json::Value = resp.json().await.unwrap_or_default();
        Ok(RefundResult {
            refund_id: refund_id.to_string(),
            remote_refund_id: v.get("id").and_then(|r| r.as_str()).map(ToString::to_string),
            accepted,
        })
    }
}
