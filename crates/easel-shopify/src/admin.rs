//! HTTP client for the Shopify Admin `products.json` endpoint.
//!
//! Used by the SKU auto-mapper to fetch the full storefront catalog. Handles
//! rate limiting (429), not-found (404), and other non-2xx responses as typed
//! errors, and follows `Link`-header cursors across pages.

use std::time::Duration;

use reqwest::Client;

use easel_core::retry::retry_with_backoff;

use crate::error::ShopifyError;
use crate::pagination::extract_next_cursor;
use crate::types::{AdminProduct, AdminProductsResponse};

/// Maximum number of catalog pages to fetch before returning an error.
/// Prevents infinite loops on cycling cursors.
const MAX_PAGES: usize = 200;

/// Admin API version used for catalog fetches.
const API_VERSION: &str = "2024-01";

/// Authenticated client for the Shopify Admin API.
///
/// Transient errors (429, network failures) are automatically retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct AdminClient {
    client: Client,
    base: String,
    access_token: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl AdminClient {
    /// Creates an `AdminClient` with configured timeout, `User-Agent`, and
    /// retry policy. `base` is the store origin, e.g.
    /// `https://my-shop.myshopify.com` (or a mock server URL in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_owned(),
            access_token: access_token.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches the complete product catalog, following pagination cursors.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ShopifyError::NotFound`] — HTTP 404 (not retried).
    /// - [`ShopifyError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ShopifyError::Deserialize`] — response body is not valid JSON.
    /// - [`ShopifyError::PaginationLimit`] — cursor chain exceeded [`MAX_PAGES`].
    pub async fn fetch_all_products(&self, limit: u32) -> Result<Vec<AdminProduct>, ShopifyError> {
        let mut products = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let (page, link_header) = self.fetch_products_page(limit, cursor.as_deref()).await?;
            products.extend(page.products);

            cursor = extract_next_cursor(link_header.as_deref());
            if cursor.is_none() {
                return Ok(products);
            }
        }

        Err(ShopifyError::PaginationLimit {
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches one page of products, with automatic retry on transient errors.
    ///
    /// Returns the parsed page plus the raw `Link` header (if any) so callers
    /// can drive multi-page fetches.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Self::fetch_all_products`], minus
    /// `PaginationLimit`.
    pub async fn fetch_products_page(
        &self,
        limit: u32,
        page_info: Option<&str>,
    ) -> Result<(AdminProductsResponse, Option<String>), ShopifyError> {
        let url = self.products_url(limit, page_info);

        retry_with_backoff(
            self.max_retries,
            self.backoff_base_secs,
            ShopifyError::is_retriable,
            || {
                let url = url.clone();
                async move {
                    let response = self
                        .client
                        .get(&url)
                        .header("X-Shopify-Access-Token", &self.access_token)
                        .header(reqwest::header::ACCEPT, "application/json")
                        .send()
                        .await?;
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(60);
                        return Err(ShopifyError::RateLimited { retry_after_secs });
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ShopifyError::NotFound { url });
                    }

                    if !status.is_success() {
                        return Err(ShopifyError::UnexpectedStatus {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    // Extract the Link header before consuming the response body.
                    let link_header = response
                        .headers()
                        .get(reqwest::header::LINK)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);

                    let body = response.text().await?;
                    let parsed = serde_json::from_str::<AdminProductsResponse>(&body)
                        .map_err(|e| ShopifyError::Deserialize {
                            context: format!("admin products page from {url}"),
                            source: e,
                        })?;

                    Ok((parsed, link_header))
                }
            },
        )
        .await
    }

    fn products_url(&self, limit: u32, page_info: Option<&str>) -> String {
        let mut url = format!(
            "{base}/admin/api/{API_VERSION}/products.json?limit={limit}",
            base = self.base
        );
        if let Some(cursor) = page_info {
            url.push_str("&page_info=");
            url.push_str(cursor);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_url_without_cursor() {
        let client = AdminClient::new("https://shop.test/", "tok", 5, "easel-test/0.1", 0, 0)
            .expect("client");
        assert_eq!(
            client.products_url(250, None),
            "https://shop.test/admin/api/2024-01/products.json?limit=250"
        );
    }

    #[test]
    fn products_url_with_cursor() {
        let client =
            AdminClient::new("https://shop.test", "tok", 5, "easel-test/0.1", 0, 0).expect("client");
        assert_eq!(
            client.products_url(250, Some("abc")),
            "https://shop.test/admin/api/2024-01/products.json?limit=250&page_info=abc"
        );
    }
}
