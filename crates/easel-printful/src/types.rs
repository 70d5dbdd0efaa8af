//! Printful API request and response types.
//!
//! ## Response envelope
//!
//! Every v1 endpoint wraps its payload in `{"result": ...}` on success and
//! returns `{"error": {"message": ...}}` with a non-2xx status on failure.
//!
//! ## Sync variants vs. external ids
//!
//! `SyncVariant::id` is the **sync variant id** the orders endpoint expects in
//! `items[].sync_variant_id`. The dashboard displays `external_id`, which is a
//! different value — mixing the two is the classic integration mistake, hence
//! both are surfaced in the ops listing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Catalog responses
// ---------------------------------------------------------------------------

/// `GET /sync/products` — summary list of sync products.
#[derive(Debug, Deserialize)]
pub struct SyncProductsResponse {
    #[serde(default)]
    pub result: Vec<SyncProductSummary>,
}

/// One sync product in the summary list. Variants are NOT included here;
/// they require a per-product detail fetch.
#[derive(Debug, Deserialize)]
pub struct SyncProductSummary {
    pub id: i64,
    pub name: String,
}

/// `GET /sync/products/{id}` — detail with variants.
#[derive(Debug, Deserialize)]
pub struct SyncProductDetailResponse {
    pub result: SyncProductDetail,
}

#[derive(Debug, Deserialize)]
pub struct SyncProductDetail {
    pub sync_product: SyncProductSummary,
    #[serde(default)]
    pub sync_variants: Vec<SyncVariant>,
}

/// One orderable sync variant.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncVariant {
    /// Sync variant id — what `items[].sync_variant_id` must carry.
    pub id: i64,

    /// Dashboard-visible identifier; not usable for ordering.
    #[serde(default)]
    pub external_id: Option<String>,

    pub name: String,

    /// SKU, matched against the storefront catalog during auto-mapping.
    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub sync_product_id: Option<i64>,
}

impl SyncVariant {
    /// The variant's SKU, with empty strings normalized to `None`.
    #[must_use]
    pub fn sku_normalized(&self) -> Option<&str> {
        self.sku.as_deref().filter(|s| !s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Order creation
// ---------------------------------------------------------------------------

/// `POST /orders` request body.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    /// Caller-minted reference, unique per (order, line item) pair.
    pub external_id: String,
    /// Shipping method tier, e.g. `"STANDARD"`.
    pub shipping: String,
    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
    pub retail_costs: RetailCosts,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state_code: String,
    pub state_name: String,
    pub country_code: String,
    pub country_name: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub sync_variant_id: i64,
    pub quantity: u32,
    pub retail_price: Decimal,
    pub name: String,
    pub files: Vec<OrderFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderFile {
    /// File role; `"default"` is the print file.
    #[serde(rename = "type")]
    pub file_type: String,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetailCosts {
    pub currency: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// `POST /orders` success envelope.
#[derive(Debug, Deserialize)]
pub struct OrderCreatedResponse {
    pub result: CreatedOrder,
}

#[derive(Debug, Deserialize)]
pub struct CreatedOrder {
    pub id: i64,
}

/// Error envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
