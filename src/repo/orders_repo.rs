use crate::domain::order::{
    Customer, LineItem, OrderRecord, OrderStatus, OrderType, PaymentStatus, ShippingAddress,
};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrdersRepo {
    pub pool: PgPool,
}

pub struct NewOrder {
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
    pub order_type: OrderType,
    pub seller_token: Option<String>,
    pub agent_code: Option<String>,
    pub coupon_code: Option<String>,
    pub gateway: String,
}

fn row_to_order(row: sqlx::postgres::PgRow) -> Result<OrderRecord> {
    let items: serde_json::Value = row.get("items");
    let payment_status: String = row.get("payment_status");
    let order_status: String = row.get("order_status");
    let order_type: String = row.get("order_type");
    Ok(OrderRecord {
        order_id: row.get("order_id"),
        transaction_id: row.get("transaction_id"),
        merchant_order_id: row.get("merchant_order_id"),
        customer: Customer {
            name: row.get("customer_name"),
            email: row.get("customer_email"),
            phone: row.get("customer_phone"),
        },
        shipping_address: ShippingAddress {
            street: row.get("ship_street"),
            city: row.get("ship_city"),
            state: row.get("ship_state"),
            pincode: row.get("ship_pincode"),
            country: row.get("ship_country"),
        },
        items: serde_json::from_value(items)?,
        total_amount_minor: row.get("total_amount_minor"),
        upfront_amount_minor: row.get("upfront_amount_minor"),
        remaining_amount_minor: row.get("remaining_amount_minor"),
        payment_method: row.get("payment_method"),
        payment_status: PaymentStatus::parse(&payment_status),
        order_status: match order_status.as_str() {
            "PROCESSING" => OrderStatus::Processing,
            "CONFIRMED" => OrderStatus::Confirmed,
            "MANUFACTURING" => OrderStatus::Manufacturing,
            "SHIPPED" => OrderStatus::Shipped,
            "DELIVERED" => OrderStatus::Delivered,
            _ => OrderStatus::WaitingPayment,
        },
        order_type: OrderType::parse(&order_type),
        seller_token: row.get("seller_token"),
        agent_code: row.get("agent_code"),
        coupon_code: row.get("coupon_code"),
        gateway: row.get("gateway"),
        finalized_at: row.get("finalized_at"),
        created_at: row.get("created_at"),
    })
}

const ORDER_COLUMNS: &str = r#"
    order_id, transaction_id, merchant_order_id,
    customer_name, customer_email, customer_phone,
    ship_street, ship_city, ship_state, ship_pincode, ship_country,
    items, total_amount_minor, upfront_amount_minor, remaining_amount_minor,
    payment_method, payment_status, order_status, order_type,
    seller_token, agent_code, coupon_code, gateway, finalized_at, created_at
"#;

impl OrdersRepo {
    pub async fn insert(&self, order: &NewOrder) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, transaction_id, merchant_order_id,
                customer_name, customer_email, customer_phone,
                ship_street, ship_city, ship_state, ship_pincode, ship_country,
                items, total_amount_minor, upfront_amount_minor, remaining_amount_minor,
                payment_method, payment_status, order_status, order_type,
                seller_token, agent_code, coupon_code, gateway
            ) VALUES (
                $1, $2, $3,
                $4, $5, $6,
                $7, $8, $9, $10, $11,
                $12, $13, $14, $15,
                $16, 'PENDING', 'WAITING_PAYMENT', $17,
                $18, $19, $20, $21
            )
            "#,
        )
        .bind(order.order_id)
        .bind(&order.transaction_id)
        .bind(&order.merchant_order_id)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.shipping_address.street)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.pincode)
        .bind(&order.shipping_address.country)
        .bind(serde_json::to_value(&order.items)?)
        .bind(order.total_amount_minor)
        .bind(order.upfront_amount_minor)
        .bind(order.remaining_amount_minor)
        .bind(&order.payment_method)
        .bind(order.order_type.as_str())
        .bind(&order.seller_token)
        .bind(&order.agent_code)
        .bind(&order.coupon_code)
        .bind(&order.gateway)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE transaction_id = $1",
            ORDER_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_order).transpose()
    }

    pub async fn find_by_merchant_order_id(
        &self,
        merchant_order_id: &str,
    ) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE merchant_order_id = $1",
            ORDER_COLUMNS
        ))
        .bind(merchant_order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_order).transpose()
    }

    /// Compensating cleanup when remote order creation fails. Only removes
    /// the record while it is still an unpaid stub.
    pub async fn delete_pending(&self, order_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM orders WHERE order_id = $1 AND payment_status = 'PENDING'")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Adopts the id the gateway echoed back when it differs from the locally
    /// generated one. Happens once, before checkout returns, never after.
    pub async fn set_transaction_id(&self, order_id: Uuid, transaction_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE orders SET transaction_id = $2 WHERE order_id = $1 AND payment_status = 'PENDING'",
        )
        .bind(order_id)
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Conditional completion: flips PENDING to COMPLETED and stamps
    /// finalized_at in one statement. Returns true only for the caller that
    /// actually won the transition, which is the caller allowed to run the
    /// finalizer. Concurrent webhook deliveries and status polls race here
    /// safely.
    pub async fn try_complete(&self, transaction_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = 'COMPLETED', order_status = 'PROCESSING', finalized_at = now()
            WHERE transaction_id = $1 AND payment_status <> 'COMPLETED'
            "#,
        )
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Marks a still-pending order failed. Completed orders never move back.
    pub async fn try_fail(&self, transaction_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = 'FAILED' WHERE transaction_id = $1 AND payment_status = 'PENDING'",
        )
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
