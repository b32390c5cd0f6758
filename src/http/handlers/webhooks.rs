use crate::domain::order::err;
use crate::service::webhook_verifier::verify_hmac_signature;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

/// PhonePe server-to-server callback. The embedded state is never trusted;
/// the verifier re-queries the gateway before touching the order.
pub async fn phonepe_webhook(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(err("MALFORMED_CALLBACK", "callback body is not valid json")),
        )
            .into_response();
    };

    match state.webhook_verifier.process("phonepe", &payload).await {
        Ok(outcome) => (axum::http::StatusCode::OK, Json(outcome)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

/// Razorpay webhook. The body signature is checked before anything is parsed
/// out of it; an unsigned or mis-signed body is malformed, not merely
/// suspicious, because even its lookup key cannot be trusted.
pub async fn razorpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if !state.razorpay_webhook_secret.is_empty() {
        let signature = headers
            .get("X-Razorpay-Signature")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        if !verify_hmac_signature(&state.razorpay_webhook_secret, &body, signature) {
            return (
                axum::http::StatusCode::BAD_REQUEST,
                Json(err("MALFORMED_CALLBACK", "webhook signature verification failed")),
            )
                .into_response();
        }
    }

    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(err("MALFORMED_CALLBACK", "callback body is not valid json")),
        )
            .into_response();
    };

    match state.webhook_verifier.process("razorpay", &payload).await {
        Ok(outcome) => (axum::http::StatusCode::OK, Json(outcome)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
