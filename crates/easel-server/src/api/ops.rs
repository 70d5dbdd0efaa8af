//! Operator endpoints for diagnosing the variant mapping and the provider
//! integration. Bearer-auth protected: `test-order` creates a REAL order on
//! the provider.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use easel_fulfillment::MappingSource;
use easel_printful::{NewOrder, OrderFile, OrderItem, Recipient, RetailCosts};
use rust_decimal::Decimal;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// One row of the flattened sync-variant listing.
///
/// `sync_variant_id` is what order submission needs; `external_id` is what
/// the provider dashboard displays. Listing both is the point — confusing
/// them is the usual mapping mistake.
#[derive(Debug, Serialize)]
pub struct SyncVariantRow {
    pub sync_variant_id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub sku: Option<String>,
    pub sync_product_id: Option<i64>,
}

/// `GET /api/ops/sync-variants`
pub async fn list_sync_variants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.printful.list_all_sync_variants().await {
        Ok(variants) => {
            let rows: Vec<SyncVariantRow> = variants
                .into_iter()
                .map(|v| SyncVariantRow {
                    sync_variant_id: v.id,
                    external_id: v.external_id,
                    name: v.name,
                    sku: v.sku,
                    sync_product_id: v.sync_product_id,
                })
                .collect();
            Json(ApiResponse {
                data: rows,
                meta: ResponseMeta::new(req_id.0),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "sync variant listing failed");
            ApiError::new(req_id.0, "upstream_error", "failed to list sync variants")
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MappingData {
    pub storefront_variant_id: String,
    pub provider_variant_id: Option<i64>,
    pub source: Option<&'static str>,
    pub has_mapping: bool,
}

/// `GET /api/ops/mapping/{variant_id}`
pub async fn get_mapping(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(variant_id): Path<String>,
) -> impl IntoResponse {
    let resolved = state.mapper.resolve_with_source(&variant_id).await;
    let data = MappingData {
        storefront_variant_id: variant_id,
        provider_variant_id: resolved.map(|(id, _)| id),
        source: resolved.map(|(_, source)| match source {
            MappingSource::Static => "static",
            MappingSource::SkuMatch => "sku_match",
        }),
        has_mapping: resolved.is_some(),
    };

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub struct TestOrderRequest {
    pub variant_id: String,
    pub image_url: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestOrderData {
    pub provider_order_id: i64,
    pub external_id: String,
}

/// `POST /api/ops/test-order`
///
/// Resolves the mapping and submits a one-item order with a placeholder
/// recipient, exercising the exact path the webhook pipeline takes.
pub async fn create_test_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<TestOrderRequest>,
) -> impl IntoResponse {
    let Some(sync_variant_id) = state.mapper.resolve(&request.variant_id).await else {
        return ApiError::new(
            req_id.0,
            "not_found",
            format!("no provider mapping for variant {}", request.variant_id),
        )
        .into_response();
    };

    let external_id = format!("test-{}", Uuid::new_v4());
    let order = NewOrder {
        external_id: external_id.clone(),
        shipping: "STANDARD".to_owned(),
        recipient: Recipient {
            name: request
                .customer_name
                .unwrap_or_else(|| "Test Customer".to_owned()),
            company: String::new(),
            address1: "123 Test Street".to_owned(),
            address2: String::new(),
            city: "Test City".to_owned(),
            state_code: "CA".to_owned(),
            state_name: "California".to_owned(),
            country_code: "US".to_owned(),
            country_name: "United States".to_owned(),
            zip: "90210".to_owned(),
            phone: String::new(),
            email: request
                .customer_email
                .unwrap_or_else(|| "test@example.com".to_owned()),
        },
        items: vec![OrderItem {
            sync_variant_id,
            quantity: 1,
            retail_price: Decimal::new(2500, 2),
            name: "Test Pet Portrait".to_owned(),
            files: vec![OrderFile {
                file_type: "default".to_owned(),
                url: request.image_url,
                filename: format!("{external_id}.jpg"),
            }],
        }],
        retail_costs: RetailCosts {
            currency: "USD".to_owned(),
            subtotal: Decimal::new(2500, 2),
            discount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(2500, 2),
        },
    };

    match state.printful.create_order(&order).await {
        Ok(provider_order_id) => Json(ApiResponse {
            data: TestOrderData {
                provider_order_id,
                external_id,
            },
            meta: ResponseMeta::new(req_id.0),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "test order submission failed");
            ApiError::new(req_id.0, "upstream_error", e.to_string()).into_response()
        }
    }
}
