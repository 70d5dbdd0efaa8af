//! Static storefront-variant → provider-sync-variant table.
//!
//! Storefront variant ids appear in two forms depending on the source: the
//! bare numeric string (`"51871373918526"`, as in order webhooks) and the
//! fully-qualified resource path (`"gid://shopify/ProductVariant/51871373918526"`,
//! as in Storefront API objects). The table is keyed by the bare form;
//! [`VariantMap::lookup`] also tries the final path segment so both spellings
//! resolve to the same provider id.
//!
//! The built-in table is the seed; a YAML file can extend or override it at
//! process start. Entries are only ever overwritten, never deleted.

use std::collections::HashMap;
use std::path::Path;

use crate::error::FulfillmentError;

/// Hand-maintained seed mapping for the current shop catalog.
const BUILTIN: &[(&str, i64)] = &[
    // White glossy mug
    ("52249775178046", 4_980_193_865),
    // Framed canvas, black frame: 8×10 / 12×16 / 18×24
    ("51871373918526", 4_858_094_038),
    ("51871373951294", 4_858_094_039),
    ("51871373984062", 4_858_094_040),
    // Framed canvas, brown frame: 8×10 / 12×16 / 18×24
    ("51871374016830", 4_858_094_041),
    ("51871374049598", 4_858_094_042),
    ("51871374082366", 4_858_094_043),
    // Framed poster, black frame: 8×10 / 12×16 / 18×24
    ("51871562105150", 4_858_132_933),
    ("51871562137918", 4_858_132_934),
    ("51871562170686", 4_858_132_935),
    // Framed poster, red oak frame: 8×10 / 12×16 / 18×24
    ("51871562203454", 4_858_132_936),
    ("51871562236222", 4_858_132_937),
    ("51871562268990", 4_858_132_938),
    // Tote bag: black / yellow
    ("51871440765246", 4_858_115_991),
    ("51871440798014", 4_858_115_992),
];

/// Immutable after process start; see [`crate::mapper::VariantMapper`] for the
/// time-boxed SKU-join overlay.
#[derive(Debug, Clone)]
pub struct VariantMap {
    entries: HashMap<String, i64>,
}

impl VariantMap {
    /// The built-in seed table.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(storefront_id, provider_id)| (storefront_id.to_owned(), provider_id))
            .collect();
        Self { entries }
    }

    /// Builds the startup table: the built-in seed, extended and overridden
    /// by the YAML file at `path` when it exists.
    ///
    /// A missing file is fine (the seed stands alone); an unreadable or
    /// malformed file is a configuration error worth failing startup over.
    ///
    /// # Errors
    ///
    /// Returns [`FulfillmentError::MappingTable`] on read or parse failure.
    pub fn load(path: &Path) -> Result<Self, FulfillmentError> {
        let mut map = Self::builtin();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                entries = map.len(),
                "no variant map file; using built-in table"
            );
            return Ok(map);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| FulfillmentError::MappingTable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let overrides: HashMap<String, i64> =
            serde_yaml::from_str(&raw).map_err(|e| FulfillmentError::MappingTable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            overrides = overrides.len(),
            "extending built-in variant map from file"
        );
        map.entries.extend(overrides);
        Ok(map)
    }

    /// Resolves a storefront variant id to a provider sync-variant id.
    ///
    /// Tries the exact key first, then — for path-like ids — the final
    /// `/`-separated segment.
    #[must_use]
    pub fn lookup(&self, storefront_variant_id: &str) -> Option<i64> {
        if let Some(&provider_id) = self.entries.get(storefront_variant_id) {
            return Some(provider_id);
        }

        if storefront_variant_id.contains('/') {
            let bare = storefront_variant_id
                .rsplit('/')
                .next()
                .unwrap_or(storefront_variant_id);
            return self.entries.get(bare).copied();
        }

        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_resolves_bare_form() {
        let map = VariantMap::builtin();
        assert_eq!(map.lookup("51871373918526"), Some(4_858_094_038));
    }

    #[test]
    fn builtin_table_resolves_gid_form_via_last_segment() {
        let map = VariantMap::builtin();
        assert_eq!(
            map.lookup("gid://shopify/ProductVariant/51871373918526"),
            Some(4_858_094_038)
        );
    }

    #[test]
    fn bare_and_gid_forms_resolve_identically_for_every_entry() {
        let map = VariantMap::builtin();
        for &(storefront_id, provider_id) in BUILTIN {
            assert_eq!(map.lookup(storefront_id), Some(provider_id));
            assert_eq!(
                map.lookup(&format!("gid://shopify/ProductVariant/{storefront_id}")),
                Some(provider_id),
                "gid form of {storefront_id} should resolve to the same provider id"
            );
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        let map = VariantMap::builtin();
        assert_eq!(map.lookup("99999999999999"), None);
        assert_eq!(map.lookup("gid://shopify/ProductVariant/99999999999999"), None);
    }

    #[test]
    fn load_with_missing_file_falls_back_to_builtin() {
        let map = VariantMap::load(Path::new("/nonexistent/variant-map.yaml"))
            .expect("missing file is not an error");
        assert_eq!(map.len(), BUILTIN.len());
    }
}
