use crate::domain::order::{err, ErrorEnvelope, OrderRecord, PaymentStatus};
use crate::gateways::{PaymentGateway, RemoteOrderState};
use crate::repo::orders_repo::OrdersRepo;
use crate::service::finalizer::OrderFinalizer;
use axum::http::StatusCode;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;

/// Identifiers lifted out of a webhook body. The reported state is carried
/// for logging only; it is never what drives the order transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCallback {
    pub transaction_id: Option<String>,
    pub merchant_order_id: Option<String>,
    pub reported_state: Option<String>,
}

/// Decodes a provider notification envelope. Accepts either a plain JSON
/// body or the base64-in-a-`response`-field wrapping some providers use.
/// Returns None when no transaction/order identifier can be found at all.
pub fn decode_callback(body: &serde_json::Value) -> Option<DecodedCallback> {
    let inner: serde_json::Value = match body.get("response").and_then(|r| r.as_str()) {
        Some(encoded) => {
            let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
            serde_json::from_slice(&bytes).ok()?
        }
        None => body.clone(),
    };

    let payload = inner.get("payload").unwrap_or(&inner);
    let data = payload.get("data").unwrap_or(payload);

    let get_str = |v: &serde_json::Value, key: &str| {
        v.get(key).and_then(|s| s.as_str()).map(ToString::to_string)
    };

    // Razorpay nests the order id inside the payment entity.
    let entity_order_id = payload
        .get("payment")
        .and_then(|p| p.get("entity"))
        .and_then(|e| e.get("order_id"))
        .and_then(|s| s.as_str())
        .map(ToString::to_string);
    let entity_state = payload
        .get("payment")
        .and_then(|p| p.get("entity"))
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
        .map(ToString::to_string);

    let transaction_id = get_str(data, "orderId")
        .or_else(|| get_str(data, "transactionId"))
        .or(entity_order_id);
    let merchant_order_id =
        get_str(data, "merchantOrderId").or_else(|| get_str(data, "merchantTransactionId"));
    let reported_state = get_str(data, "state")
        .or_else(|| get_str(&inner, "code"))
        .or(entity_state);

    if transaction_id.is_none() && merchant_order_id.is_none() {
        return None;
    }

    Some(DecodedCallback {
        transaction_id,
        merchant_order_id,
        reported_state,
    })
}

/// HMAC-SHA256 check over the raw webhook body. A bad signature means the
/// body cannot be trusted even for the lookup key.
pub fn verify_hmac_signature(secret: &str, raw_body: &[u8], signature_hex: &str) -> bool {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();
    let expected_hex: String = expected.iter().map(|b| format!("{:02x}", b)).collect();
    expected_hex == signature_hex
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierAction {
    /// Remote says completed and we have not finalized: flip status and run
    /// the finalizer.
    CompleteAndFinalize,
    /// Remote says failed while we are still pending: record the failure.
    MarkFailed,
    /// Nothing to do; repeated delivery or payment still in flight.
    Ignore,
}

/// The verdict is a function of the authoritative remote state and our own
/// record only. The webhook's embedded status never reaches this function,
/// which is what makes forged or replayed bodies harmless.
pub fn decide(remote: RemoteOrderState, local: PaymentStatus) -> VerifierAction {
    match (remote, local) {
        (RemoteOrderState::Completed, PaymentStatus::Completed) => VerifierAction::Ignore,
        (RemoteOrderState::Completed, _) => VerifierAction::CompleteAndFinalize,
        (RemoteOrderState::Failed, PaymentStatus::Failed) => VerifierAction::Ignore,
        (RemoteOrderState::Failed, PaymentStatus::Completed) => VerifierAction::Ignore,
        (RemoteOrderState::Failed, PaymentStatus::Pending) => VerifierAction::MarkFailed,
        (RemoteOrderState::Pending, _) => VerifierAction::Ignore,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookOutcome {
    pub transaction_id: String,
    pub payment_status: PaymentStatus,
    pub finalized: bool,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    pub orders_repo: OrdersRepo,
    pub finalizer: OrderFinalizer,
    pub phonepe: Arc<dyn PaymentGateway>,
    pub razorpay: Arc<dyn PaymentGateway>,
}

impl WebhookVerifier {
    fn gateway_for(&self, name: &str) -> &Arc<dyn PaymentGateway> {
        if name == "razorpay" {
            &self.razorpay
        } else {
            &self.phonepe
        }
    }

    /// Full notification pipeline: decode, locate, re-verify against the
    /// gateway, transition, finalize. Error statuses follow provider retry
    /// semantics: 400/404 are permanent, 500 asks the provider to retry.
    pub async fn process(
        &self,
        gateway_name: &str,
        body: &serde_json::Value,
    ) -> Result<WebhookOutcome, (StatusCode, ErrorEnvelope)> {
        let decoded = decode_callback(body).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                err("MALFORMED_CALLBACK", "callback envelope missing transaction identifier"),
            )
        })?;

        let order = self.locate(&decoded).await.map_err(|e| {
            tracing::error!("order lookup failed during callback: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                err("INTERNAL", "order lookup failed"),
            )
        })?;
        let order = order.ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                err("ORDER_NOT_FOUND", "no order matches the callback identifiers"),
            )
        })?;

        self.verify_and_apply(gateway_name, order, decoded.reported_state.as_deref())
            .await
    }

    async fn locate(&self, decoded: &DecodedCallback) -> anyhow::Result<Option<OrderRecord>> {
        if let Some(txn) = &decoded.transaction_id {
            if let Some(order) = self.orders_repo.find_by_transaction_id(txn).await? {
                return Ok(Some(order));
            }
        }
        if let Some(moid) = &decoded.merchant_order_id {
            return self.orders_repo.find_by_merchant_order_id(moid).await;
        }
        Ok(None)
    }

    /// Shared by webhook delivery and the synchronous status poll: both
    /// re-query the gateway and go through the same conditional update, so
    /// they can race each other without double-finalizing.
    pub async fn verify_and_apply(
        &self,
        gateway_name: &str,
        order: OrderRecord,
        reported_state: Option<&str>,
    ) -> Result<WebhookOutcome, (StatusCode, ErrorEnvelope)> {
        let gateway = self.gateway_for(gateway_name);
        let remote = gateway
            .order_status(&order.transaction_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    transaction_id = %order.transaction_id,
                    "authoritative status query failed: {:#}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err("GATEWAY_ERROR", "gateway status verification failed"),
                )
            })?;

        if let Some(reported) = reported_state {
            if reported != remote.raw_state {
                tracing::warn!(
                    transaction_id = %order.transaction_id,
                    reported = %reported,
                    authoritative = %remote.raw_state,
                    "webhook state disagrees with gateway status query"
                );
            }
        }

        match decide(remote.state, order.payment_status) {
            VerifierAction::CompleteAndFinalize => {
                let won = self
                    .orders_repo
                    .try_complete(&order.transaction_id)
                    .await
                    .map_err(|e| {
                        tracing::error!("completion update failed: {:#}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            err("INTERNAL", "order update failed"),
                        )
                    })?;

                let mut finalized = false;
                if won {
                    // Only the caller that won the conditional update runs
                    // the side-effect pipeline, and it runs against the
                    // post-transition record, not the row loaded before the
                    // update.
                    self.finalizer.finalize(&order.clone().completed()).await;
                    finalized = true;
                } else {
                    tracing::info!(
                        transaction_id = %order.transaction_id,
                        "order already completed by a concurrent caller"
                    );
                }

                Ok(WebhookOutcome {
                    transaction_id: order.transaction_id,
                    payment_status: PaymentStatus::Completed,
                    finalized,
                })
            }
            VerifierAction::MarkFailed => {
                self.orders_repo
                    .try_fail(&order.transaction_id)
                    .await
                    .map_err(|e| {
                        tracing::error!("failure update failed: {:#}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            err("INTERNAL", "order update failed"),
                        )
                    })?;

                Ok(WebhookOutcome {
                    transaction_id: order.transaction_id,
                    payment_status: PaymentStatus::Failed,
                    finalized: false,
                })
            }
            VerifierAction::Ignore => Ok(WebhookOutcome {
                transaction_id: order.transaction_id,
                payment_status: order.payment_status,
                finalized: false,
            }),
        }
    }
}
