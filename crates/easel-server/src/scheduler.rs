//! Background job scheduler.
//!
//! Registers the hourly SKU-mapping cache warm. Webhook-path lookups still
//! refresh on demand when the cache is stale; the warm job just keeps the
//! stale window from ever being hit by a customer order in steady state.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use easel_fulfillment::VariantMapper;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(mapper: Arc<VariantMapper>) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_mapping_warm_job(&scheduler, mapper).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the hourly mapping-cache warm (`0 0 * * * *`, on the hour).
async fn register_mapping_warm_job(
    scheduler: &JobScheduler,
    mapper: Arc<VariantMapper>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let mapper = Arc::clone(&mapper);

        Box::pin(async move {
            tracing::info!("scheduler: warming SKU mapping cache");
            match mapper.refresh_cache().await {
                Ok(mapped) => {
                    tracing::info!(mapped, "scheduler: SKU mapping cache warmed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "scheduler: SKU mapping warm failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
