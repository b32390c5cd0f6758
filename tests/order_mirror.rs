use chrono::Utc;
use commerce_payments::domain::order::{
    Customer, LineItem, OrderRecord, OrderStatus, OrderType, PaymentStatus, ShippingAddress,
};
use commerce_payments::service::order_mirror::OrderMirror;
use uuid::Uuid;

fn order(transaction_id: &str, status: PaymentStatus) -> OrderRecord {
    OrderRecord {
        order_id: Uuid::new_v4(),
        transaction_id: transaction_id.to_string(),
        merchant_order_id: transaction_id.to_string(),
        customer: Customer {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9999999999".to_string(),
        },
        shipping_address: ShippingAddress {
            street: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
            country: "India".to_string(),
        },
        items: vec![LineItem {
            name: "Widget".to_string(),
            quantity: 1,
            unit_price_minor: 49950,
            product_id: None,
        }],
        total_amount_minor: 49950,
        upfront_amount_minor: 49950,
        remaining_amount_minor: 0,
        payment_method: "ONLINE".to_string(),
        payment_status: status,
        order_status: OrderStatus::Processing,
        order_type: OrderType::ProductOrder,
        seller_token: None,
        agent_code: None,
        coupon_code: None,
        gateway: "phonepe".to_string(),
        finalized_at: Some(Utc::now()),
        created_at: Utc::now(),
    }
}

fn temp_mirror_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("orders_mirror_{}_{}.jsonl", tag, Uuid::new_v4()))
}

#[tokio::test]
async fn mirror_appends_one_line_per_order() {
    let path = temp_mirror_path("append");
    let mirror = OrderMirror::new(&path);

    mirror.upsert(&order("TXN_A", PaymentStatus::Completed)).await.unwrap();
    mirror.upsert(&order("TXN_B", PaymentStatus::Completed)).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v.get("transaction_id").is_some());
    }

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn finalized_order_mirrors_post_transition_state() {
    // The verifier loads the row before the completion update wins; what the
    // finalizer mirrors must be the completed view, never that stale copy.
    let path = temp_mirror_path("finalized");
    let mirror = OrderMirror::new(&path);

    let mut pre_update = order("TXN_C", PaymentStatus::Pending);
    pre_update.order_status = OrderStatus::WaitingPayment;
    pre_update.finalized_at = None;

    mirror.upsert(&pre_update.completed()).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let v: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(v["payment_status"], "COMPLETED");
    assert_eq!(v["order_status"], "PROCESSING");
    assert!(!v["finalized_at"].is_null());

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn mirror_replaces_existing_transaction_in_place() {
    let path = temp_mirror_path("upsert");
    let mirror = OrderMirror::new(&path);

    mirror.upsert(&order("TXN_A", PaymentStatus::Pending)).await.unwrap();
    mirror.upsert(&order("TXN_A", PaymentStatus::Completed)).await.unwrap();

    let content = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(v["payment_status"], "COMPLETED");

    let _ = tokio::fs::remove_file(&path).await;
}
