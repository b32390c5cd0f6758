use crate::domain::money::to_minor_units;
use crate::domain::order::{
    err, internal, CheckoutRequest, ErrorEnvelope, LineItem, OrderType, SessionHandle,
};
use crate::gateways::{CreateOrderRequest, PaymentGateway};
use crate::repo::orders_repo::{NewOrder, OrdersRepo};
use crate::repo::settings_repo::SettingsRepo;
use axum::http::StatusCode;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CheckoutService {
    pub orders_repo: OrdersRepo,
    pub settings_repo: SettingsRepo,
    pub phonepe: Arc<dyn PaymentGateway>,
    pub razorpay: Arc<dyn PaymentGateway>,
    pub redirect_base_url: String,
    pub callback_base_url: String,
}

/// Locally generated transaction id: millisecond timestamp plus a random
/// alphanumeric suffix. Collisions are astronomically rare; the unique index
/// on orders.transaction_id is the backstop.
pub fn generate_merchant_order_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("TXN_{}_{}", millis, suffix.to_uppercase())
}

pub fn validate_checkout(req: &CheckoutRequest) -> Result<(), (StatusCode, ErrorEnvelope)> {
    if req.amount <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            err("VALIDATION_ERROR", "amount must be greater than zero"),
        ));
    }
    if req.items.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            err("VALIDATION_ERROR", "order must contain at least one item"),
        ));
    }
    if req.customer.phone.trim().is_empty() && req.customer.email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            err("VALIDATION_ERROR", "customer phone or email is required"),
        ));
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                err("VALIDATION_ERROR", "item quantity must be positive"),
            ));
        }
    }
    Ok(())
}

impl CheckoutService {
    fn gateway_for(&self, name: &str) -> Result<&Arc<dyn PaymentGateway>, (StatusCode, ErrorEnvelope)> {
        match name {
            "phonepe" => Ok(&self.phonepe),
            "razorpay" => Ok(&self.razorpay),
            other => Err((
                StatusCode::BAD_REQUEST,
                err("VALIDATION_ERROR", &format!("unknown gateway '{}'", other)),
            )),
        }
    }

    pub async fn initiate(
        &self,
        req: CheckoutRequest,
    ) -> Result<SessionHandle, (StatusCode, ErrorEnvelope)> {
        validate_checkout(&req)?;

        let gateway_name = req.gateway.as_deref().unwrap_or("phonepe").to_string();
        let gateway = self.gateway_for(&gateway_name)?.clone();

        let total_amount_minor = to_minor_units(req.amount);
        // COD orders only put the configured upfront portion through the
        // gateway; the balance is collected on delivery.
        let (charge_minor, remaining_minor) = if req.payment_method == "COD" {
            let upfront = self
                .settings_repo
                .cod_upfront_amount_minor()
                .await
                .map_err(internal)?;
            if upfront > 0 && upfront < total_amount_minor {
                (upfront, total_amount_minor - upfront)
            } else {
                (total_amount_minor, 0)
            }
        } else {
            (total_amount_minor, 0)
        };

        let order_id = Uuid::new_v4();
        let merchant_order_id = generate_merchant_order_id();
        let items: Vec<LineItem> = req
            .items
            .iter()
            .map(|i| LineItem {
                name: i.name.clone(),
                quantity: i.quantity,
                unit_price_minor: to_minor_units(i.unit_price),
                product_id: i.product_id,
            })
            .collect();

        let mut customer = req.customer.clone();
        if customer.email.trim().is_empty() {
            // Relaxed checkout: the gateway requires an address, the store
            // does not.
            customer.email = "guest@orders.invalid".to_string();
        }

        let new_order = NewOrder {
            order_id,
            transaction_id: merchant_order_id.clone(),
            merchant_order_id: merchant_order_id.clone(),
            customer: customer.clone(),
            shipping_address: req.shipping_address.clone(),
            items,
            total_amount_minor,
            upfront_amount_minor: charge_minor,
            remaining_amount_minor: remaining_minor,
            payment_method: req.payment_method.clone(),
            order_type: req.order_type.unwrap_or(OrderType::ProductOrder),
            seller_token: req.seller_token.clone(),
            agent_code: req.agent_code.clone(),
            coupon_code: req.coupon_code.clone(),
            gateway: gateway_name.clone(),
        };
        self.orders_repo.insert(&new_order).await.map_err(internal)?;

        let create = CreateOrderRequest {
            merchant_order_id: merchant_order_id.clone(),
            amount_minor: charge_minor,
            currency: "INR".to_string(),
            order_id,
            redirect_url: format!("{}/payment/result/{}", self.redirect_base_url, merchant_order_id),
            callback_url: format!("{}/webhooks/{}", self.callback_base_url, gateway_name),
            customer_phone: Some(customer.phone.clone()),
            customer_email: Some(customer.email.clone()),
        };

        let remote = match gateway.create_order(&create).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::error!(
                    gateway = %gateway_name,
                    merchant_order_id = %merchant_order_id,
                    "remote order creation failed, rolling back order: {:#}",
                    e
                );
                // Never leave a pending order pointing at a remote order
                // that does not exist.
                if let Err(del) = self.orders_repo.delete_pending(order_id).await {
                    tracing::error!("compensating delete failed for {}: {:#}", order_id, del);
                }
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err("PAYMENT_INITIATION_FAILED", "payment could not be initiated"),
                ));
            }
        };

        // Some providers key everything by their own order id; store whichever
        // value the gateway will echo back in callbacks.
        let transaction_id = if remote.remote_order_id != merchant_order_id {
            self.orders_repo
                .set_transaction_id(order_id, &remote.remote_order_id)
                .await
                .map_err(internal)?;
            remote.remote_order_id.clone()
        } else {
            merchant_order_id.clone()
        };

        Ok(SessionHandle {
            order_id,
            transaction_id,
            merchant_order_id,
            redirect_url: remote.redirect_url,
            amount_minor: charge_minor,
        })
    }
}
