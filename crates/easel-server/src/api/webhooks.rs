//! Order webhook endpoints.
//!
//! The handlers work on the raw body bytes: signature verification must see
//! exactly what the platform signed, so no JSON extractor sits in front.
//!
//! Response contract with the sender: 401 for a bad signature, 500 for an
//! unparsable body, otherwise 200 `"OK"` once every actionable line item has
//! been attempted. Per-item failures are logged in the order report and
//! deliberately do NOT surface in the status — a non-200 would make the
//! platform re-deliver the whole order and risk duplicating the items that
//! already succeeded.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use easel_fulfillment::OrderEvent;

use super::AppState;

/// Signature header set by the storefront platform.
const SIGNATURE_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// `POST /api/webhooks/shopify/orders/create`
pub async fn orders_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let order = match verify_and_parse(&state, &headers, &body, "orders/create") {
        Ok(order) => order,
        Err(response) => return response,
    };

    tracing::info!(
        order_id = order.id,
        email = order.email.as_deref().unwrap_or(""),
        line_items = order.line_items.len(),
        "order webhook received"
    );

    let report = state.pipeline.process_order(&order).await;
    match serde_json::to_string(&report) {
        Ok(rendered) => tracing::info!(
            order_id = report.order_id,
            submitted = report.submitted(),
            report = %rendered,
            "order processed"
        ),
        Err(e) => {
            tracing::warn!(order_id = report.order_id, error = %e, "report serialization failed");
        }
    }

    (StatusCode::OK, "OK").into_response()
}

/// `POST /api/webhooks/shopify/orders/updated`
///
/// Verified and logged; no fulfillment action is taken on updates.
pub async fn orders_updated(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let order = match verify_and_parse(&state, &headers, &body, "orders/updated") {
        Ok(order) => order,
        Err(response) => return response,
    };

    tracing::info!(order_id = order.id, "order update webhook received");
    (StatusCode::OK, "OK").into_response()
}

/// `GET /api/webhooks/shopify/test` — connectivity probe for webhook setup.
pub async fn connectivity() -> Response {
    Json(json!({
        "status": "OK",
        "message": "order webhooks endpoint is reachable",
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

/// Shared verify → parse prefix of both order routes. The `Err` side is the
/// ready-to-send rejection: 401 when the signature is the problem, 500 when
/// the body is.
fn verify_and_parse(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
    topic: &str,
) -> Result<OrderEvent, Response> {
    let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if !state.verifier.is_valid(body, header) {
        tracing::warn!(
            topic,
            header_present = header.is_some(),
            "webhook signature verification failed"
        );
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
    }

    OrderEvent::parse(body).map_err(|e| {
        tracing::error!(topic, error = %e, "webhook body failed to parse");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    })
}
