use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let shopify_domain = require("EASEL_SHOPIFY_DOMAIN")?;
    let shopify_storefront_token = require("EASEL_SHOPIFY_STOREFRONT_TOKEN")?;
    let printful_api_key = require("EASEL_PRINTFUL_API_KEY")?;

    let env = parse_environment(&or_default("EASEL_ENV", "development"));

    let bind_addr = parse_addr("EASEL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("EASEL_LOG_LEVEL", "info");

    let shopify_api_base = lookup("EASEL_SHOPIFY_API_BASE")
        .unwrap_or_else(|_| format!("https://{shopify_domain}"));
    let shopify_admin_token = lookup("EASEL_SHOPIFY_ADMIN_TOKEN").ok();
    let shopify_webhook_secret = lookup("EASEL_SHOPIFY_WEBHOOK_SECRET").ok();

    let printful_api_base = or_default("EASEL_PRINTFUL_API_BASE", "https://api.printful.com");

    let variant_map_path = PathBuf::from(or_default(
        "EASEL_VARIANT_MAP_PATH",
        "./config/variant-map.yaml",
    ));
    let mapping_cache_ttl_secs = parse_u64("EASEL_MAPPING_CACHE_TTL_SECS", "3600")?;

    let http_timeout_secs = parse_u64("EASEL_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("EASEL_HTTP_USER_AGENT", "easel/0.1 (fulfillment-bridge)");
    let http_max_retries = parse_u32("EASEL_HTTP_MAX_RETRIES", "3")?;
    let http_retry_backoff_base_secs = parse_u64("EASEL_HTTP_RETRY_BACKOFF_BASE_SECS", "5")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        shopify_domain,
        shopify_api_base,
        shopify_storefront_token,
        shopify_admin_token,
        shopify_webhook_secret,
        printful_api_key,
        printful_api_base,
        variant_map_path,
        mapping_cache_ttl_secs,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
