mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use easel_fulfillment::{
    FulfillmentPipeline, SubmissionLedger, VariantMap, VariantMapper, WebhookVerifier,
};
use easel_printful::PrintfulClient;
use easel_shopify::{AdminClient, StorefrontClient};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(easel_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let is_development = matches!(config.env, easel_core::Environment::Development);

    let printful = Arc::new(PrintfulClient::new(
        &config.printful_api_base,
        &config.printful_api_key,
        config.http_timeout_secs,
        &config.http_user_agent,
        config.http_max_retries,
        config.http_retry_backoff_base_secs,
    )?);
    let storefront = Arc::new(StorefrontClient::new(
        &config.shopify_api_base,
        &config.shopify_storefront_token,
        config.http_timeout_secs,
        &config.http_user_agent,
    )?);
    let admin = config
        .shopify_admin_token
        .as_deref()
        .map(|token| {
            AdminClient::new(
                &config.shopify_api_base,
                token,
                config.http_timeout_secs,
                &config.http_user_agent,
                config.http_max_retries,
                config.http_retry_backoff_base_secs,
            )
        })
        .transpose()?;

    let static_map = VariantMap::load(&config.variant_map_path)?;
    tracing::info!(entries = static_map.len(), "variant map loaded");

    let mapper = Arc::new(VariantMapper::new(
        static_map,
        admin,
        Arc::clone(&printful),
        Duration::from_secs(config.mapping_cache_ttl_secs),
    ));
    let pipeline = Arc::new(FulfillmentPipeline::new(
        Arc::clone(&mapper),
        Arc::clone(&printful),
        Arc::new(SubmissionLedger::new()),
    ));
    let verifier = Arc::new(WebhookVerifier::new(
        config.shopify_webhook_secret.as_deref(),
        is_development,
    )?);

    let _scheduler = scheduler::build_scheduler(Arc::clone(&mapper)).await?;

    let auth = AuthState::from_env(is_development)?;
    let app = build_app(
        AppState {
            verifier,
            pipeline,
            mapper,
            printful,
            storefront,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "easel server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
