//! Shopify Admin API response types for `GET /admin/api/2024-01/products.json`.
//!
//! Only the fields the SKU auto-mapper consumes are modeled; the Admin API
//! returns far more (options, images, inventory) and serde ignores the rest.
//!
//! `sku` is present on every variant object but may be an empty string when
//! the merchant never assigned one — the mapper treats empty as absent.

use serde::Deserialize;

/// Top-level response from the Admin products endpoint.
#[derive(Debug, Deserialize)]
pub struct AdminProductsResponse {
    pub products: Vec<AdminProduct>,
}

/// A single product from the Admin API.
#[derive(Debug, Deserialize)]
pub struct AdminProduct {
    /// Shopify numeric product ID.
    pub id: i64,

    /// Display name of the product.
    pub title: String,

    /// All variants of this product.
    #[serde(default)]
    pub variants: Vec<AdminVariant>,
}

/// A single variant of an [`AdminProduct`].
#[derive(Debug, Deserialize)]
pub struct AdminVariant {
    /// Shopify numeric variant ID — the bare form of the webhook's
    /// `variant_id` and the last segment of the `gid://` form.
    pub id: i64,

    /// Variant title, e.g. `"Black / 8″×10″"` or `"Default Title"`.
    #[serde(default)]
    pub title: Option<String>,

    /// Stock-keeping unit. Empty string when unassigned.
    #[serde(default)]
    pub sku: Option<String>,

    /// Current price as a decimal string.
    #[serde(default)]
    pub price: Option<String>,
}

impl AdminVariant {
    /// The variant's SKU, with empty strings normalized to `None`.
    #[must_use]
    pub fn sku_normalized(&self) -> Option<&str> {
        self.sku.as_deref().filter(|s| !s.trim().is_empty())
    }
}
