use commerce_payments::domain::money::{commission_minor, from_minor_units, to_minor_units};
use commerce_payments::domain::order::{
    CheckoutItem, CheckoutRequest, Customer, ShippingAddress,
};
use commerce_payments::service::checkout_service::{generate_merchant_order_id, validate_checkout};

#[test]
fn two_decimal_amounts_convert_exactly() {
    assert_eq!(to_minor_units(499.50), 49950);
    assert_eq!(to_minor_units(1000.00), 100000);
    assert_eq!(to_minor_units(0.01), 1);
    assert_eq!(to_minor_units(19.99), 1999);
    assert_eq!(from_minor_units(49950), 499.50);
}

#[test]
fn commission_rounds_to_nearest_paisa() {
    assert_eq!(commission_minor(100000, 10.0), 10000);
    assert_eq!(commission_minor(100000, 30.0), 30000);
    // 333.33 at 10% = 33.333 → 33.33
    assert_eq!(commission_minor(33333, 10.0), 3333);
}

#[test]
fn merchant_order_ids_have_stable_shape() {
    let id = generate_merchant_order_id();
    assert!(id.starts_with("TXN_"));
    let parts: Vec<&str> = id.splitn(3, '_').collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 6);
}

#[test]
fn merchant_order_ids_do_not_trivially_collide() {
    let a = generate_merchant_order_id();
    let b = generate_merchant_order_id();
    assert_ne!(a, b);
}

fn valid_request() -> CheckoutRequest {
    serde_json::from_value(serde_json::json!({
        "customer": { "name": "Asha", "email": "asha@example.com", "phone": "9999999999" },
        "shipping_address": {
            "street": "12 MG Road", "city": "Pune", "state": "MH", "pincode": "411001"
        },
        "items": [ { "name": "Widget", "quantity": 2, "unit_price": 249.75 } ],
        "amount": 499.50
    }))
    .unwrap()
}

#[test]
fn valid_checkout_passes_validation() {
    assert!(validate_checkout(&valid_request()).is_ok());
}

#[test]
fn zero_amount_is_rejected() {
    let mut req = valid_request();
    req.amount = 0.0;
    let (status, body) = validate_checkout(&req).unwrap_err();
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[test]
fn empty_cart_is_rejected() {
    let mut req = valid_request();
    req.items.clear();
    assert!(validate_checkout(&req).is_err());
}

#[test]
fn missing_contact_info_is_rejected() {
    let mut req = valid_request();
    req.customer = Customer {
        name: "Asha".to_string(),
        email: "  ".to_string(),
        phone: "".to_string(),
    };
    assert!(validate_checkout(&req).is_err());
}

#[test]
fn non_positive_quantity_is_rejected() {
    let mut req = valid_request();
    req.items = vec![CheckoutItem {
        name: "Widget".to_string(),
        quantity: 0,
        unit_price: 10.0,
        product_id: None,
    }];
    assert!(validate_checkout(&req).is_err());
}

#[test]
fn shipping_country_defaults_when_omitted() {
    let addr: ShippingAddress = serde_json::from_value(serde_json::json!({
        "street": "12 MG Road", "city": "Pune", "state": "MH", "pincode": "411001"
    }))
    .unwrap();
    assert_eq!(addr.country, "India");
}
