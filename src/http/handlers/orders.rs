use crate::domain::order::{err, internal, PaymentStatus};
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// Synchronous "check status now". Any order not yet completed is re-queried
/// against the gateway through the same verification path the webhook uses,
/// so a poll racing a webhook delivery cannot double-finalize, and a payment
/// captured after a local failure mark is still picked up.
pub async fn get_order(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    let order = match state.orders_repo.find_by_transaction_id(&transaction_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                axum::http::StatusCode::NOT_FOUND,
                Json(err("ORDER_NOT_FOUND", "no order with that transaction id")),
            )
                .into_response();
        }
        Err(e) => {
            let (status, body) = internal(e);
            return (status, Json(body)).into_response();
        }
    };

    if order.payment_status != PaymentStatus::Completed {
        let gateway = order.gateway.clone();
        match state
            .webhook_verifier
            .verify_and_apply(&gateway, order, None)
            .await
        {
            Ok(outcome) => return (axum::http::StatusCode::OK, Json(outcome)).into_response(),
            Err((status, body)) => return (status, Json(body)).into_response(),
        }
    }

    (axum::http::StatusCode::OK, Json(order)).into_response()
}
