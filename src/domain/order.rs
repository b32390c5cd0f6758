use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> PaymentStatus {
        match s {
            "COMPLETED" => PaymentStatus::Completed,
            "FAILED" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    WaitingPayment,
    Processing,
    Confirmed,
    Manufacturing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::WaitingPayment => "WAITING_PAYMENT",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Manufacturing => "MANUFACTURING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    ProductOrder,
    PlanPurchase,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::ProductOrder => "PRODUCT_ORDER",
            OrderType::PlanPurchase => "PLAN_PURCHASE",
        }
    }

    pub fn parse(s: &str) -> OrderType {
        if s == "PLAN_PURCHASE" {
            OrderType::PlanPurchase
        } else {
            OrderType::ProductOrder
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Full persisted order record. `transaction_id` is the gateway-facing key
/// every callback lookup goes through; it never changes after checkout
/// initiation returns.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub merchant_order_id: String,
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub items: Vec<LineItem>,
    pub total_amount_minor: i64,
    pub upfront_amount_minor: i64,
    pub remaining_amount_minor: i64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub order_type: OrderType,
    pub seller_token: Option<String>,
    pub agent_code: Option<String>,
    pub coupon_code: Option<String>,
    pub gateway: String,
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// The record as it reads after winning the completion update. Anything
    /// that runs after the flip, the finalizer and the mirror included, must
    /// see the post-transition state rather than the row loaded before it.
    pub fn completed(mut self) -> OrderRecord {
        self.payment_status = PaymentStatus::Completed;
        self.order_status = OrderStatus::Processing;
        self.finalized_at = Some(Utc::now());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CheckoutItem>,
    /// Decimal rupees; converted once to minor units at initiation.
    pub amount: f64,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub seller_token: Option<String>,
    #[serde(default)]
    pub agent_code: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

fn default_payment_method() -> String {
    "ONLINE".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    pub quantity: i32,
    /// Decimal rupees.
    pub unit_price: f64,
    #[serde(default)]
    pub product_id: Option<Uuid>,
}

/// Checkout response: where to send the customer, plus enough identifiers
/// for the client to poll status later.
#[derive(Debug, Clone, Serialize)]
pub struct SessionHandle {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub merchant_order_id: String,
    pub redirect_url: String,
    pub amount_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

pub fn internal(e: anyhow::Error) -> (axum::http::StatusCode, ErrorEnvelope) {
    tracing::error!("internal error: {:#}", e);
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        err("INTERNAL", "internal error"),
    )
}
