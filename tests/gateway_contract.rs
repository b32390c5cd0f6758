use commerce_payments::gateways::mock::MockGateway;
use commerce_payments::gateways::{CreateOrderRequest, PaymentGateway, RemoteOrderState};
use uuid::Uuid;

fn request() -> CreateOrderRequest {
    CreateOrderRequest {
        merchant_order_id: "TXN_1700000000000_AB12CD".to_string(),
        amount_minor: 49950,
        currency: "INR".to_string(),
        order_id: Uuid::new_v4(),
        redirect_url: "http://localhost/payment/result/TXN_1700000000000_AB12CD".to_string(),
        callback_url: "http://localhost/webhooks/phonepe".to_string(),
        customer_phone: Some("9999999999".to_string()),
        customer_email: Some("asha@example.com".to_string()),
    }
}

#[tokio::test]
async fn create_order_returns_redirect_handle() {
    let gateway = MockGateway {
        behavior: "OK".to_string(),
    };
    let remote = gateway.create_order(&request()).await.unwrap();
    assert_eq!(remote.remote_order_id, "TXN_1700000000000_AB12CD");
    assert!(remote.redirect_url.contains(&remote.remote_order_id));
}

#[tokio::test]
async fn declined_creation_surfaces_as_error() {
    let gateway = MockGateway {
        behavior: "ALWAYS_FAIL_CREATE".to_string(),
    };
    assert!(gateway.create_order(&request()).await.is_err());
}

#[tokio::test]
async fn status_states_normalize() {
    let completed = MockGateway {
        behavior: "STATUS_COMPLETED".to_string(),
    };
    let status = completed.order_status("any").await.unwrap();
    assert_eq!(status.state, RemoteOrderState::Completed);

    let failed = MockGateway {
        behavior: "STATUS_FAILED".to_string(),
    };
    let status = failed.order_status("any").await.unwrap();
    assert_eq!(status.state, RemoteOrderState::Failed);

    let pending = MockGateway {
        behavior: "OK".to_string(),
    };
    let status = pending.order_status("any").await.unwrap();
    assert_eq!(status.state, RemoteOrderState::Pending);
}

#[tokio::test]
async fn refunds_are_keyed_by_refund_id() {
    let gateway = MockGateway {
        behavior: "OK".to_string(),
    };
    let first = gateway.issue_refund("rfnd_1", "TXN_X", 1000).await.unwrap();
    let again = gateway.issue_refund("rfnd_1", "TXN_X", 1000).await.unwrap();
    assert!(first.accepted);
    assert_eq!(first.refund_id, again.refund_id);
    assert_eq!(first.remote_refund_id, again.remote_refund_id);
}
