use base64::Engine;
use commerce_payments::domain::order::PaymentStatus;
use commerce_payments::gateways::RemoteOrderState;
use commerce_payments::service::webhook_verifier::{
    decide, decode_callback, verify_hmac_signature, VerifierAction,
};

#[test]
fn decodes_plain_json_envelope() {
    let body = serde_json::json!({
        "event": "checkout.order.completed",
        "payload": {
            "orderId": "OMO123",
            "merchantOrderId": "TXN_1700000000000_AB12CD",
            "state": "COMPLETED"
        }
    });

    let decoded = decode_callback(&body).expect("should decode");
    assert_eq!(decoded.transaction_id.as_deref(), Some("OMO123"));
    assert_eq!(
        decoded.merchant_order_id.as_deref(),
        Some("TXN_1700000000000_AB12CD")
    );
    assert_eq!(decoded.reported_state.as_deref(), Some("COMPLETED"));
}

#[test]
fn decodes_base64_response_envelope() {
    let inner = serde_json::json!({
        "code": "PAYMENT_SUCCESS",
        "data": { "merchantTransactionId": "TXN_1700000000000_XY99ZZ" }
    });
    let encoded = base64::engine::general_purpose::STANDARD.encode(inner.to_string());
    let body = serde_json::json!({ "response": encoded });

    let decoded = decode_callback(&body).expect("should decode");
    assert_eq!(
        decoded.merchant_order_id.as_deref(),
        Some("TXN_1700000000000_XY99ZZ")
    );
    assert_eq!(decoded.reported_state.as_deref(), Some("PAYMENT_SUCCESS"));
}

#[test]
fn decodes_nested_payment_entity() {
    let body = serde_json::json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "order_id": "order_Nxx123",
                    "status": "captured"
                }
            }
        }
    });

    let decoded = decode_callback(&body).expect("should decode");
    assert_eq!(decoded.transaction_id.as_deref(), Some("order_Nxx123"));
    assert_eq!(decoded.reported_state.as_deref(), Some("captured"));
}

#[test]
fn rejects_envelope_without_identifiers() {
    let body = serde_json::json!({ "event": "something", "payload": { "state": "COMPLETED" } });
    assert!(decode_callback(&body).is_none());

    let body = serde_json::json!({ "response": "not-base64!!!" });
    assert!(decode_callback(&body).is_none());
}

#[test]
fn completed_remote_state_finalizes_pending_order() {
    let action = decide(RemoteOrderState::Completed, PaymentStatus::Pending);
    assert_eq!(action, VerifierAction::CompleteAndFinalize);
}

#[test]
fn second_completed_delivery_is_a_no_op() {
    // First delivery completes the order...
    assert_eq!(
        decide(RemoteOrderState::Completed, PaymentStatus::Pending),
        VerifierAction::CompleteAndFinalize
    );
    // ...and the replay sees the already-completed local status.
    assert_eq!(
        decide(RemoteOrderState::Completed, PaymentStatus::Completed),
        VerifierAction::Ignore
    );
}

#[test]
fn forged_completed_webhook_loses_to_authoritative_failed() {
    // A forged body claiming COMPLETED never reaches the decision; only the
    // gateway's own answer does. The gateway says FAILED, so the order fails.
    assert_eq!(
        decide(RemoteOrderState::Failed, PaymentStatus::Pending),
        VerifierAction::MarkFailed
    );
}

#[test]
fn completed_order_never_moves_backwards() {
    assert_eq!(
        decide(RemoteOrderState::Failed, PaymentStatus::Completed),
        VerifierAction::Ignore
    );
}

#[test]
fn late_capture_repairs_locally_failed_order() {
    // A payment can capture after we marked the order failed. Both the
    // webhook path and the status poll re-verify anything not yet completed,
    // so the recovery must fire from either side.
    assert_eq!(
        decide(RemoteOrderState::Completed, PaymentStatus::Failed),
        VerifierAction::CompleteAndFinalize
    );
}

#[test]
fn pending_remote_state_changes_nothing() {
    assert_eq!(
        decide(RemoteOrderState::Pending, PaymentStatus::Pending),
        VerifierAction::Ignore
    );
    assert_eq!(
        decide(RemoteOrderState::Pending, PaymentStatus::Failed),
        VerifierAction::Ignore
    );
}

#[test]
fn hmac_signature_round_trip() {
    let secret = "whsec_test";
    let body = br#"{"event":"payment.captured"}"#;

    let mut mac = <hmac::Hmac<sha2::Sha256> as hmac::Mac>::new_from_slice(secret.as_bytes()).unwrap();
    hmac::Mac::update(&mut mac, body);
    let sig: String = hmac::Mac::finalize(mac)
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    assert!(verify_hmac_signature(secret, body, &sig));
    assert!(!verify_hmac_signature(secret, body, "deadbeef"));
    assert!(!verify_hmac_signature("other-secret", body, &sig));
}
