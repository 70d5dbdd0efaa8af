//! Variant resolution: static table first, SKU-join cache second.
//!
//! The SKU join is expensive — a full storefront catalog fetch plus a full
//! provider sync catalog fetch — so its result lives in a time-boxed cache.
//! The cache is guarded by an async mutex with a freshness re-check after
//! acquisition: concurrent lookups arriving during a stale window all queue on
//! the lock, the first performs the refresh, and the rest see a fresh cache
//! when they get the lock. At most one refresh runs per stale window.
//!
//! Catalog fetch failures are non-fatal: the lookup falls through to the
//! existing (possibly stale, possibly empty) cache and ultimately to `None`.
//! A missing mapping must never abort sibling line items.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use easel_printful::PrintfulClient;
use easel_shopify::AdminClient;

use crate::mapping::VariantMap;

/// Catalog page size for storefront fetches.
const CATALOG_PAGE_LIMIT: u32 = 250;

/// Where a successful resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingSource {
    /// The static table (built-in or YAML-extended).
    Static,
    /// The SKU-join cache.
    SkuMatch,
}

#[derive(Default)]
struct SkuCache {
    /// Bare storefront variant id → provider sync-variant id.
    mapping: HashMap<String, i64>,
    refreshed_at: Option<Instant>,
}

impl SkuCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.refreshed_at
            .is_some_and(|at| at.elapsed() < ttl)
    }
}

/// Resolves storefront variant ids to provider sync-variant ids.
pub struct VariantMapper {
    static_map: VariantMap,
    /// `None` when no Admin API token is configured — auto-mapping disabled.
    shopify: Option<AdminClient>,
    printful: Arc<PrintfulClient>,
    cache: Mutex<SkuCache>,
    cache_ttl: Duration,
}

impl VariantMapper {
    #[must_use]
    pub fn new(
        static_map: VariantMap,
        shopify: Option<AdminClient>,
        printful: Arc<PrintfulClient>,
        cache_ttl: Duration,
    ) -> Self {
        if shopify.is_none() {
            tracing::warn!(
                "EASEL_SHOPIFY_ADMIN_TOKEN not set; SKU auto-mapping disabled, \
                 only the static variant table applies"
            );
        }
        Self {
            static_map,
            shopify,
            printful,
            cache: Mutex::new(SkuCache::default()),
            cache_ttl,
        }
    }

    /// Resolves a storefront variant id. `None` means no mapping exists —
    /// a normal outcome, not an error.
    pub async fn resolve(&self, storefront_variant_id: &str) -> Option<i64> {
        self.resolve_with_source(storefront_variant_id)
            .await
            .map(|(provider_id, _)| provider_id)
    }

    /// Like [`Self::resolve`], also reporting which table matched.
    pub async fn resolve_with_source(
        &self,
        storefront_variant_id: &str,
    ) -> Option<(i64, MappingSource)> {
        if let Some(provider_id) = self.static_map.lookup(storefront_variant_id) {
            return Some((provider_id, MappingSource::Static));
        }

        self.shopify.as_ref()?;

        let mut cache = self.cache.lock().await;
        if !cache.is_fresh(self.cache_ttl) {
            // Re-checked under the lock: a concurrent caller may have
            // refreshed while this one waited.
            match self.build_sku_mapping().await {
                Ok(mapping) => {
                    tracing::info!(mapped = mapping.len(), "SKU auto-mapping refreshed");
                    cache.mapping = mapping;
                    cache.refreshed_at = Some(Instant::now());
                }
                Err(reason) => {
                    tracing::warn!(
                        error = %reason,
                        "SKU auto-mapping refresh failed; serving existing cache"
                    );
                }
            }
        }

        cached_lookup(&cache.mapping, storefront_variant_id)
            .map(|provider_id| (provider_id, MappingSource::SkuMatch))
    }

    /// Forces a cache refresh, returning the number of mapped variants.
    ///
    /// Used by the hourly warm job so webhook-path lookups rarely pay the
    /// two-catalog-fetch cost. Auto-mapping disabled ⇒ `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure message; callers log and move on.
    pub async fn refresh_cache(&self) -> Result<usize, String> {
        if self.shopify.is_none() {
            return Ok(0);
        }

        let mapping = self.build_sku_mapping().await?;
        let mapped = mapping.len();

        let mut cache = self.cache.lock().await;
        cache.mapping = mapping;
        cache.refreshed_at = Some(Instant::now());
        Ok(mapped)
    }

    /// Fetches both catalogs and joins them on equal non-empty SKUs.
    async fn build_sku_mapping(&self) -> Result<HashMap<String, i64>, String> {
        let shopify = self
            .shopify
            .as_ref()
            .expect("build_sku_mapping requires an admin client");

        let products = shopify
            .fetch_all_products(CATALOG_PAGE_LIMIT)
            .await
            .map_err(|e| format!("storefront catalog fetch failed: {e}"))?;

        let sync_variants = self
            .printful
            .list_all_sync_variants()
            .await
            .map_err(|e| format!("provider catalog fetch failed: {e}"))?;

        let by_sku: HashMap<&str, i64> = sync_variants
            .iter()
            .filter_map(|v| v.sku_normalized().map(|sku| (sku, v.id)))
            .collect();

        let mut mapping = HashMap::new();
        for product in &products {
            for variant in &product.variants {
                let Some(sku) = variant.sku_normalized() else {
                    continue;
                };
                if let Some(&sync_variant_id) = by_sku.get(sku) {
                    mapping.insert(variant.id.to_string(), sync_variant_id);
                }
            }
        }

        Ok(mapping)
    }
}

/// Cache lookup over both id spellings: exact, then final path segment.
fn cached_lookup(mapping: &HashMap<String, i64>, id: &str) -> Option<i64> {
    if let Some(&provider_id) = mapping.get(id) {
        return Some(provider_id);
    }
    if id.contains('/') {
        let bare = id.rsplit('/').next().unwrap_or(id);
        return mapping.get(bare).copied();
    }
    None
}
