#[test]
fn internal_api_key_env_name_is_stable() {
    let cfg = commerce_payments::config::AppConfig::from_env();
    assert!(!cfg.internal_api_key.is_empty());
}

#[test]
fn gateway_timeout_defaults_to_thirty_seconds() {
    std::env::remove_var("GATEWAY_TIMEOUT_MS");
    let cfg = commerce_payments::config::AppConfig::from_env();
    assert_eq!(cfg.gateway_timeout_ms, 30_000);
}

#[test]
fn public_endpoints_are_documented() {
    let readme = std::fs::read_to_string("README.md").unwrap_or_default();
    assert!(readme.contains("/webhooks/phonepe"));
    assert!(readme.contains("/webhooks/razorpay"));
    assert!(readme.contains("/orders/:transaction_id"));
    assert!(readme.contains("/admin/withdrawals/:withdrawal_id/reject"));
    assert!(readme.contains("/ops/readiness"));
}
