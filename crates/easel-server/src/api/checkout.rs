//! Checkout cart creation.
//!
//! The browser posts the chosen variant plus the generated artwork URL; this
//! handler creates a storefront cart with those values attached as line
//! attributes and hands back the checkout URL. The attributes round-trip
//! through the platform and come back on the order webhook as the line-item
//! properties the fulfillment pipeline reads.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use easel_shopify::{CartLine, ShopifyError};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub variant_id: Option<String>,
    pub quantity: Option<u32>,
    pub ai_image_url: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutData {
    pub url: String,
}

/// `POST /api/checkout`
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let Some(variant_id) = request.variant_id.filter(|v| !v.is_empty()) else {
        return ApiError::new(req_id.0, "validation_error", "variant_id is required")
            .into_response();
    };

    let mut attributes = Vec::new();
    if let Some(url) = request.ai_image_url.filter(|v| !v.is_empty()) {
        attributes.push(("AI_Image_URL".to_owned(), url));
    }
    if let Some(email) = request.user_email.filter(|v| !v.is_empty()) {
        attributes.push(("User_Email".to_owned(), email));
    }

    let line = CartLine {
        merchandise_id: to_merchandise_gid(&variant_id),
        quantity: request.quantity.unwrap_or(1).max(1),
        attributes,
    };

    match state.storefront.create_cart(&line).await {
        Ok(url) => Json(ApiResponse {
            data: CheckoutData { url },
            meta: ResponseMeta::new(req_id.0),
        })
        .into_response(),
        Err(ShopifyError::Storefront { message }) => {
            tracing::warn!(variant_id = %variant_id, error = %message, "cart creation rejected");
            ApiError::new(req_id.0, "bad_request", message).into_response()
        }
        Err(e) => {
            tracing::error!(variant_id = %variant_id, error = %e, "cart creation failed");
            ApiError::new(req_id.0, "upstream_error", "failed to create checkout cart")
                .into_response()
        }
    }
}

/// The Storefront API wants the fully-qualified merchandise id; the shop page
/// may hand us the bare numeric variant id.
fn to_merchandise_gid(variant_id: &str) -> String {
    if variant_id.starts_with("gid://") {
        variant_id.to_owned()
    } else {
        format!("gid://shopify/ProductVariant/{variant_id}")
    }
}
