use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintfulError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Printful (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Non-2xx API response. `message` is the provider's `error.message` when
    /// the body parsed; `body` is the raw response text for diagnostics.
    #[error("Printful API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },
}

impl PrintfulError {
    /// Returns `true` for transient conditions worth retrying after a backoff.
    ///
    /// Only catalog reads are ever retried — order creation has a side effect
    /// on the provider and is never retried regardless of this predicate.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            PrintfulError::RateLimited { .. } | PrintfulError::Http(_)
        )
    }
}
