pub mod config;
pub mod domain {
    pub mod commission;
    pub mod money;
    pub mod order;
    pub mod referral;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod checkout;
        pub mod commissions;
        pub mod ops;
        pub mod orders;
        pub mod webhooks;
        pub mod withdrawals;
    }
    pub mod middleware {
        pub mod admin_auth;
        pub mod rate_limit;
    }
}
pub mod repo {
    pub mod agents_repo;
    pub mod commission_entries_repo;
    pub mod orders_repo;
    pub mod products_repo;
    pub mod sellers_repo;
    pub mod settings_repo;
    pub mod withdrawals_repo;
}
pub mod service {
    pub mod checkout_service;
    pub mod finalizer;
    pub mod ledger;
    pub mod mailer;
    pub mod order_mirror;
    pub mod webhook_verifier;
}

#[derive(Clone)]
pub struct AppState {
    pub checkout_service: service::checkout_service::CheckoutService,
    pub webhook_verifier: service::webhook_verifier::WebhookVerifier,
    pub ledger: service::ledger::CommissionLedger,
    pub orders_repo: repo::orders_repo::OrdersRepo,
    pub withdrawals_repo: repo::withdrawals_repo::WithdrawalsRepo,
    pub razorpay_webhook_secret: String,
    pub redis_client: redis::Client,
}
