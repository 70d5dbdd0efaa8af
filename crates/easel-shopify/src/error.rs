use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Shopify (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid API base \"{base}\": {reason}")]
    InvalidBaseUrl { base: String, reason: String },

    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },

    #[error("storefront API rejected the request: {message}")]
    Storefront { message: String },
}

impl ShopifyError {
    /// Returns `true` for transient conditions worth retrying after a backoff.
    ///
    /// 429s and network-level failures are retried; everything else (404,
    /// unexpected 4xx, parse failures, storefront rejections) is propagated
    /// immediately since retrying would return the same result.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ShopifyError::RateLimited { .. } | ShopifyError::Http(_)
        )
    }
}
