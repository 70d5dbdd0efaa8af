//! Retry utilities shared by the HTTP client crates.
//!
//! Provides exponential backoff retry logic for transient errors such as
//! 429 Rate Limited responses and network failures. Which errors count as
//! transient is the caller's call: each client crate passes a predicate over
//! its own error type.

use std::future::Future;
use std::time::Duration;

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On success the result is returned immediately.
///
/// On an error for which `is_retriable` returns `true`, the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds and tries again, up to `max_retries`
/// additional attempts after the first try. If all retries are exhausted the
/// last error is returned.
///
/// Errors for which `is_retriable` returns `false` are returned immediately
/// without sleeping or retrying.
///
/// # Backoff schedule (example with `backoff_base_secs = 1`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | — (no sleep before first try) |
/// | 1 (first retry) | 1 × 2^0 = 1 s |
/// | 2 (second retry) | 1 × 2^1 = 2 s |
/// | 3 (third retry) | 1 × 2^2 = 4 s |
///
/// With `max_retries = 3` the operation is attempted at most 4 times total.
pub async fn retry_with_backoff<T, E, P, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    is_retriable: P,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds.
        // Cap at u64::MAX to prevent overflow on extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
