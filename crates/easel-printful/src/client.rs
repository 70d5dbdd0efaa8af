//! HTTP client for the Printful v1 API.
//!
//! Catalog reads (`/sync/products`) are retried on transient errors with
//! exponential backoff. Order creation (`/orders`) is NEVER retried here:
//! a request that timed out may still have created an order on the provider
//! side, and a blind retry risks duplicate fulfillment. Re-delivery is the
//! webhook sender's or an operator's explicit decision.

use std::time::Duration;

use reqwest::Client;

use easel_core::retry::retry_with_backoff;

use crate::error::PrintfulError;
use crate::types::{
    ApiErrorEnvelope, NewOrder, OrderCreatedResponse, SyncProductDetail,
    SyncProductDetailResponse, SyncProductSummary, SyncProductsResponse, SyncVariant,
};

pub struct PrintfulClient {
    client: Client,
    base: String,
    api_key: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PrintfulClient {
    /// Creates a `PrintfulClient` with configured timeout, `User-Agent`, and
    /// retry policy for catalog reads. `base` is normally
    /// `https://api.printful.com` (or a mock server URL in tests).
    ///
    /// # Errors
    ///
    /// Returns [`PrintfulError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, PrintfulError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Lists all sync products (summaries only, no variants).
    ///
    /// # Errors
    ///
    /// [`PrintfulError::Api`] on a non-2xx response after retries,
    /// [`PrintfulError::Deserialize`] on a malformed body,
    /// [`PrintfulError::Http`] on network failure.
    pub async fn list_sync_products(&self) -> Result<Vec<SyncProductSummary>, PrintfulError> {
        let url = format!("{base}/sync/products", base = self.base);
        let parsed: SyncProductsResponse = self.get_with_retry(&url).await?;
        Ok(parsed.result)
    }

    /// Fetches one sync product with its variants.
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::list_sync_products`].
    pub async fn get_sync_product(&self, id: i64) -> Result<SyncProductDetail, PrintfulError> {
        let url = format!("{base}/sync/products/{id}", base = self.base);
        let parsed: SyncProductDetailResponse = self.get_with_retry(&url).await?;
        Ok(parsed.result)
    }

    /// Flattens the full sync catalog into one variant list.
    ///
    /// The summary endpoint does not include variants, so this issues one
    /// detail fetch per product. A failed detail fetch skips that product
    /// with a warning rather than failing the whole listing — a partial
    /// variant list is still useful for mapping.
    ///
    /// # Errors
    ///
    /// Fails only if the initial product listing fails.
    pub async fn list_all_sync_variants(&self) -> Result<Vec<SyncVariant>, PrintfulError> {
        let products = self.list_sync_products().await?;
        let mut variants = Vec::new();

        for product in &products {
            match self.get_sync_product(product.id).await {
                Ok(detail) => variants.extend(detail.sync_variants),
                Err(e) => {
                    tracing::warn!(
                        product_id = product.id,
                        product_name = %product.name,
                        error = %e,
                        "skipping sync product: variant fetch failed"
                    );
                }
            }
        }

        Ok(variants)
    }

    /// Creates a fulfillment order and returns the provider's order id.
    ///
    /// This call has a side effect on the provider's system and is issued
    /// exactly once — no automatic retry.
    ///
    /// # Errors
    ///
    /// [`PrintfulError::Api`] carries the provider's `error.message` and the
    /// raw response body on a non-2xx status.
    pub async fn create_order(&self, order: &NewOrder) -> Result<i64, PrintfulError> {
        let url = format!("{base}/orders", base = self.base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(order)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), body));
        }

        let parsed = serde_json::from_str::<OrderCreatedResponse>(&body).map_err(|e| {
            PrintfulError::Deserialize {
                context: format!("order creation response from {url}"),
                source: e,
            }
        })?;

        Ok(parsed.result.id)
    }

    /// GET `url`, retrying transient failures, and parse the JSON body.
    async fn get_with_retry<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, PrintfulError> {
        retry_with_backoff(
            self.max_retries,
            self.backoff_base_secs,
            PrintfulError::is_retriable,
            || {
                let url = url.to_owned();
                async move {
                    let response = self
                        .client
                        .get(&url)
                        .bearer_auth(&self.api_key)
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
                        return Err(PrintfulError::RateLimited { retry_after_secs });
                    }

                    let body = response.text().await?;

                    if !status.is_success() {
                        return Err(api_error(status.as_u16(), body));
                    }

                    serde_json::from_str::<T>(&body).map_err(|e| PrintfulError::Deserialize {
                        context: format!("response from {url}"),
                        source: e,
                    })
                }
            },
        )
        .await
    }
}

/// Builds an [`PrintfulError::Api`] from a non-2xx response, pulling the
/// provider's `error.message` out of the body when it parses.
fn api_error(status: u16, body: String) -> PrintfulError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| "Printful API error".to_owned());

    PrintfulError::Api {
        status,
        message,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_extracts_provider_message() {
        let err = api_error(400, r#"{"error":{"message":"Invalid sync variant"}}"#.to_owned());
        match err {
            PrintfulError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid sync variant");
            }
            other => panic!("expected Api, got: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_on_unparsable_body() {
        let err = api_error(502, "<html>bad gateway</html>".to_owned());
        match err {
            PrintfulError::Api {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Printful API error");
                assert!(body.contains("bad gateway"));
            }
            other => panic!("expected Api, got: {other:?}"),
        }
    }
}
