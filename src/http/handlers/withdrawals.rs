use crate::domain::order::{err, internal};
use crate::service::ledger::WithdrawalRequestBody;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

fn admin_id(headers: &HeaderMap) -> String {
    headers
        .get("X-Admin-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("admin")
        .to_string()
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Json(body): Json<WithdrawalRequestBody>,
) -> impl IntoResponse {
    match state.ledger.request_withdrawal(body).await {
        Ok(withdrawal) => (axum::http::StatusCode::OK, Json(withdrawal)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn get_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.withdrawals_repo.find(withdrawal_id).await {
        Ok(Some(withdrawal)) => (axum::http::StatusCode::OK, Json(withdrawal)).into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(err("ORDER_NOT_FOUND", "withdrawal not found")),
        )
            .into_response(),
        Err(e) => {
            let (status, body) = internal(e);
            (status, Json(body)).into_response()
        }
    }
}

pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state
        .ledger
        .approve_withdrawal(withdrawal_id, &admin_id(&headers))
        .await
    {
        Ok(withdrawal) => (axum::http::StatusCode::OK, Json(withdrawal)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state
        .ledger
        .reject_withdrawal(withdrawal_id, &admin_id(&headers))
        .await
    {
        Ok(withdrawal) => (axum::http::StatusCode::OK, Json(withdrawal)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn complete_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state
        .ledger
        .complete_withdrawal(withdrawal_id, &admin_id(&headers))
        .await
    {
        Ok(withdrawal) => (axum::http::StatusCode::OK, Json(withdrawal)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
