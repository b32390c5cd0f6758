use crate::domain::order::CheckoutRequest;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn initiate_checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    match state.checkout_service.initiate(req).await {
        Ok(handle) => (axum::http::StatusCode::OK, Json(handle)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
