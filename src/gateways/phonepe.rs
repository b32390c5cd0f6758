use crate::gateways::{
    CreateOrderRequest, PaymentGateway, RefundResult, RemoteOrder, RemoteOrderState,
    RemoteOrderStatus,
};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

/// PhonePe checkout adapter. Auth is an OAuth client-credentials bearer token
/// cached process-wide with its expiry; concurrent refreshes may race and the
/// last successful one wins, which is wasteful but harmless.
pub struct PhonePeGateway {
    pub base_url: String,
    pub auth_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub client_version: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
    token_cache: Arc<RwLock<Option<(String, DateTime<Utc>)>>>,
}

impl PhonePeGateway {
    pub fn new(
        base_url: String,
        auth_base_url: String,
        client_id: String,
        client_secret: String,
        client_version: String,
        timeout_ms: u64,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url,
            auth_base_url,
            client_id,
            client_secret,
            client_version,
            timeout_ms,
            client,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.token_cache.read().await;
            if let Some((token, expires_at)) = &*cached {
                if Utc::now() < *expires_at {
                    return Ok(token.clone());
                }
            }
        }

        let url = format!("{}/v1/oauth/token", self.auth_base_url);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_version", self.client_version.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("phonepe token request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("phonepe token endpoint returned {}: {}", status, body));
        }

        let body: serde_json::Value = resp.json().await.context("phonepe token response not json")?;
        let token = body
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow!("phonepe token response missing access_token"))?
            .to_string();
        // expires_at is epoch seconds; keep a 60s slack so we never present
        // a token that dies mid-request.
        let expires_at = body
            .get("expires_at")
            .and_then(|e| e.as_i64())
            .map(|secs| DateTime::from_timestamp(secs - 60, 0).unwrap_or_else(Utc::now))
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(25));

        let mut cached = self.token_cache.write().await;
        *cached = Some((token.clone(), expires_at));
        Ok(token)
    }

    fn normalize_state(raw: &str) -> RemoteOrderState {
        match raw {
            "COMPLETED" => RemoteOrderState::Completed,
            "FAILED" => RemoteOrderState::Failed,
            _ => RemoteOrderState::Pending,
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PhonePeGateway {
    fn name(&self) -> &'static str {
        "phonepe"
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<RemoteOrder> {
        let token = self.access_token().await?;
        let url = format!("{}/checkout/v2/pay", self.base_url);
        let body = json!({
            "merchantOrderId": request.merchant_order_id,
            "amount": request.amount_minor,
            "metaInfo": {
                "udf1": request.order_id.to_string(),
            },
            "paymentFlow": {
                "type": "PG_CHECKOUT",
                "merchantUrls": {
                    "redirectUrl": request.redirect_url,
                }
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("O-Bearer {}", token))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("phonepe pay request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "phonepe pay returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            ));
        }

        let v: serde_json::Value = resp.json().await.context("phonepe pay response not json")?;
        let redirect_url = v
            .get("redirectUrl")
            .and_then(|u| u.as_str())
            .ok_or_else(|| anyhow!("phonepe pay response missing redirectUrl"))?
            .to_string();
        // PhonePe keys the order by the merchant-assigned id; its own orderId
        // is informational only, so the merchant id stays the transaction id.
        Ok(RemoteOrder {
            remote_order_id: request.merchant_order_id.clone(),
            redirect_url,
        })
    }

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus> {
        let token = self.access_token().await?;
        let url = format!("{}/checkout/v2/order/{}/status", self.base_url, remote_order_id);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("O-Bearer {}", token))
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("phonepe status request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(anyhow!("phonepe status returned {}", status));
        }

        let v: serde_json::Value = resp.json().await.context("phonepe status response not json")?;
        let raw_state = v
            .get("state")
            .and_then(|s| s.as_str())
            .unwrap_or("PENDING")
            .to_string();
        let error_code = v
            .get("errorCode")
            .and_then(|e| e.as_str())
            .map(ToString::to_string);

        Ok(RemoteOrderStatus {
            state: Self::normalize_state(&raw_state),
            amount_minor: v.get("amount").and_then(|a| a.as_i64()),
            raw_state,
            error_code,
        })
    }

    async fn issue_refund(
        &self,
        refund_id: &str,
        original_order_id: &str,
        amount_minor: i64,
    ) -> Result<RefundResult> {
        let token = self.access_token().await?;
        let url = format!("{}/payments/v2/refund", self.base_url);
        let body = json!({
            "merchantRefundId": refund_id,
            "originalMerchantOrderId": original_order_id,
            "amount": amount_minor,
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("O-Bearer {}", token))
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("phonepe refund request failed")?;

        let accepted = resp.status().is_success();
        let v: serde_json::Value = resp.json().await.unwrap_or_default();
        Ok(RefundResult {
            refund_id: refund_id.to_string(),
            remote_refund_id: v.get("refundId").and_then(|r| r.as_str()).map(ToString::to_string),
            accepted,
        })
    }
}
