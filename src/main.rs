use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use commerce_payments::config::AppConfig;
use commerce_payments::gateways::phonepe::PhonePeGateway;
use commerce_payments::gateways::razorpay::RazorpayGateway;
use commerce_payments::gateways::PaymentGateway;
use commerce_payments::repo::agents_repo::AgentsRepo;
use commerce_payments::repo::commission_entries_repo::CommissionEntriesRepo;
use commerce_payments::repo::orders_repo::OrdersRepo;
use commerce_payments::repo::products_repo::ProductsRepo;
use commerce_payments::repo::sellers_repo::SellersRepo;
use commerce_payments::repo::settings_repo::SettingsRepo;
use commerce_payments::repo::withdrawals_repo::WithdrawalsRepo;
use commerce_payments::service::checkout_service::CheckoutService;
use commerce_payments::service::finalizer::OrderFinalizer;
use commerce_payments::service::ledger::CommissionLedger;
use commerce_payments::service::mailer::Mailer;
use commerce_payments::service::order_mirror::OrderMirror;
use commerce_payments::service::webhook_verifier::WebhookVerifier;
use commerce_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;
    let http_client = reqwest::Client::new();

    let orders_repo = OrdersRepo { pool: pool.clone() };
    let products_repo = ProductsRepo { pool: pool.clone() };
    let sellers_repo = SellersRepo { pool: pool.clone() };
    let agents_repo = AgentsRepo { pool: pool.clone() };
    let commission_entries_repo = CommissionEntriesRepo { pool: pool.clone() };
    let withdrawals_repo = WithdrawalsRepo { pool: pool.clone() };
    let settings_repo = SettingsRepo { pool: pool.clone() };

    let phonepe: Arc<dyn PaymentGateway> = Arc::new(PhonePeGateway::new(
        cfg.phonepe_base_url.clone(),
        cfg.phonepe_auth_base_url.clone(),
        cfg.phonepe_client_id.clone(),
        cfg.phonepe_client_secret.clone(),
        cfg.phonepe_client_version.clone(),
        cfg.gateway_timeout_ms,
        http_client.clone(),
    ));
    let razorpay: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway {
        base_url: cfg.razorpay_base_url.clone(),
        key_id: cfg.razorpay_key_id.clone(),
        key_secret: cfg.razorpay_key_secret.clone(),
        checkout_page_url: cfg.razorpay_checkout_page_url.clone(),
        timeout_ms: cfg.gateway_timeout_ms,
        client: http_client.clone(),
    });

    let mailer = Mailer {
        api_url: cfg.mail_api_url.clone(),
        api_key: cfg.mail_api_key.clone(),
        from_address: cfg.mail_from_address.clone(),
        client: http_client.clone(),
    };
    let order_mirror = OrderMirror::new(cfg.order_mirror_path.clone());

    let finalizer = OrderFinalizer {
        products_repo,
        sellers_repo: sellers_repo.clone(),
        agents_repo: agents_repo.clone(),
        commission_entries_repo: commission_entries_repo.clone(),
        settings_repo: settings_repo.clone(),
        order_mirror,
        mailer,
    };

    let checkout_service = CheckoutService {
        orders_repo: orders_repo.clone(),
        settings_repo: settings_repo.clone(),
        phonepe: phonepe.clone(),
        razorpay: razorpay.clone(),
        redirect_base_url: cfg.storefront_base_url.clone(),
        callback_base_url: cfg.public_base_url.clone(),
    };

    let webhook_verifier = WebhookVerifier {
        orders_repo: orders_repo.clone(),
        finalizer,
        phonepe,
        razorpay,
    };

    let ledger = CommissionLedger {
        sellers_repo,
        agents_repo,
        commission_entries_repo,
        withdrawals_repo: withdrawals_repo.clone(),
        settings_repo,
    };

    let state = AppState {
        checkout_service,
        webhook_verifier,
        ledger,
        orders_repo,
        withdrawals_repo,
        razorpay_webhook_secret: cfg.razorpay_webhook_secret.clone(),
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
    };

    let admin_key = cfg.internal_api_key.clone();
    let admin_routes = Router::new()
        .route(
            "/admin/commissions/:entry_id/confirm",
            post(commerce_payments::http::handlers::commissions::confirm_entry),
        )
        .route(
            "/admin/commissions/:entry_id/cancel",
            post(commerce_payments::http::handlers::commissions::cancel_entry),
        )
        .route(
            "/admin/withdrawals/:withdrawal_id/approve",
            post(commerce_payments::http::handlers::withdrawals::approve_withdrawal),
        )
        .route(
            "/admin/withdrawals/:withdrawal_id/reject",
            post(commerce_payments::http::handlers::withdrawals::reject_withdrawal),
        )
        .route(
            "/admin/withdrawals/:withdrawal_id/complete",
            post(commerce_payments::http::handlers::withdrawals::complete_withdrawal),
        )
        .layer(from_fn_with_state(
            admin_key,
            commerce_payments::http::middleware::admin_auth::require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(commerce_payments::http::handlers::ops::health))
        .route(
            "/checkout",
            post(commerce_payments::http::handlers::checkout::initiate_checkout),
        )
        .route(
            "/webhooks/phonepe",
            post(commerce_payments::http::handlers::webhooks::phonepe_webhook),
        )
        .route(
            "/webhooks/razorpay",
            post(commerce_payments::http::handlers::webhooks::razorpay_webhook),
        )
        .route(
            "/orders/:transaction_id",
            get(commerce_payments::http::handlers::orders::get_order),
        )
        .route(
            "/withdrawals",
            post(commerce_payments::http::handlers::withdrawals::request_withdrawal),
        )
        .route(
            "/withdrawals/:withdrawal_id",
            get(commerce_payments::http::handlers::withdrawals::get_withdrawal),
        )
        .route("/ops/readiness", get(commerce_payments::http::handlers::ops::readiness))
        .route("/ops/liveness", get(commerce_payments::http::handlers::ops::liveness))
        .merge(admin_routes)
        .layer(from_fn_with_state(
            commerce_payments::http::middleware::rate_limit::RateLimitState {
                redis_client: redis::Client::open(cfg.redis_url.clone())?,
                max_per_minute: 300,
            },
            commerce_payments::http::middleware::rate_limit::enforce,
        ))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
