use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

fn admin_id(headers: &HeaderMap) -> String {
    headers
        .get("X-Admin-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("admin")
        .to_string()
}

pub async fn confirm_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state.ledger.confirm_entry(entry_id, &admin_id(&headers)).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"entry_id": entry_id, "status": "CONFIRMED"})),
        )
            .into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct CancelBody {
    pub reason: String,
}

pub async fn cancel_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<CancelBody>,
) -> impl IntoResponse {
    match state
        .ledger
        .cancel_entry(entry_id, &admin_id(&headers), &body.reason)
        .await
    {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({"entry_id": entry_id, "status": "CANCELLED"})),
        )
            .into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
