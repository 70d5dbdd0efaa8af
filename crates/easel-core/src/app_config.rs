use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Storefront domain, e.g. `my-shop.myshopify.com`.
    pub shopify_domain: String,
    /// Base URL for storefront API calls. Defaults to `https://{shopify_domain}`;
    /// overridable so tests can point at a local mock server.
    pub shopify_api_base: String,
    /// Storefront API token used for checkout cart creation.
    pub shopify_storefront_token: String,
    /// Admin API token used for catalog fetches during SKU auto-mapping.
    /// When absent, auto-mapping is disabled and only the static table applies.
    pub shopify_admin_token: Option<String>,
    /// Shared secret for webhook HMAC verification. Unset is only tolerated
    /// in development; the server refuses to start without it elsewhere.
    pub shopify_webhook_secret: Option<String>,
    pub printful_api_key: String,
    pub printful_api_base: String,
    /// Optional YAML file extending the built-in variant mapping table.
    pub variant_map_path: PathBuf,
    pub mapping_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("shopify_domain", &self.shopify_domain)
            .field("shopify_api_base", &self.shopify_api_base)
            .field("shopify_storefront_token", &"[redacted]")
            .field(
                "shopify_admin_token",
                &self.shopify_admin_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "shopify_webhook_secret",
                &self.shopify_webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("printful_api_key", &"[redacted]")
            .field("printful_api_base", &self.printful_api_base)
            .field("variant_map_path", &self.variant_map_path)
            .field("mapping_cache_ttl_secs", &self.mapping_cache_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_secs",
                &self.http_retry_backoff_base_secs,
            )
            .finish()
    }
}
