//! Operator CLI for the easel fulfillment bridge.
//!
//! Mirrors the ops API routes for use from a shell: inspect the provider's
//! sync catalog, test variant mappings, and submit a manual order through the
//! same clients the server uses.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use easel_core::AppConfig;
use easel_fulfillment::{MappingSource, VariantMap, VariantMapper};
use easel_printful::{
    NewOrder, OrderFile, OrderItem, PrintfulClient, Recipient, RetailCosts,
};
use easel_shopify::AdminClient;

#[derive(Debug, Parser)]
#[command(name = "easel-cli")]
#[command(about = "Operator tooling for the easel fulfillment bridge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List provider sync variants with their order-usable ids and SKUs
    Variants,
    /// Resolve a storefront variant id to a provider sync variant id
    Map {
        /// Bare numeric id or gid://shopify/ProductVariant/… form
        variant_id: String,
    },
    /// Submit a manual one-item test order to the provider (creates a REAL order)
    Order {
        #[arg(long)]
        variant_id: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, default_value = "test@example.com")]
        email: String,
        #[arg(long, default_value = "Test Customer")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = easel_core::load_app_config()?;

    match cli.command {
        Commands::Variants => run_variants(&config).await,
        Commands::Map { variant_id } => run_map(&config, &variant_id).await,
        Commands::Order {
            variant_id,
            image_url,
            email,
            name,
        } => run_order(&config, &variant_id, &image_url, &email, &name).await,
    }
}

fn printful_client(config: &AppConfig) -> anyhow::Result<Arc<PrintfulClient>> {
    Ok(Arc::new(PrintfulClient::new(
        &config.printful_api_base,
        &config.printful_api_key,
        config.http_timeout_secs,
        &config.http_user_agent,
        config.http_max_retries,
        config.http_retry_backoff_base_secs,
    )?))
}

fn variant_mapper(config: &AppConfig) -> anyhow::Result<VariantMapper> {
    let printful = printful_client(config)?;
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

    Ok(VariantMapper::new(
        VariantMap::load(&config.variant_map_path)?,
        admin,
        printful,
        Duration::from_secs(config.mapping_cache_ttl_secs),
    ))
}

async fn run_variants(config: &AppConfig) -> anyhow::Result<()> {
    let client = printful_client(config)?;
    let variants = client.list_all_sync_variants().await?;

    println!("{} sync variants (use sync_variant_id for orders):", variants.len());
    for v in &variants {
        println!(
            "  sync_variant_id={:<12} sku={:<20} external_id={:<16} {}",
            v.id,
            v.sku.as_deref().unwrap_or("-"),
            v.external_id.as_deref().unwrap_or("-"),
            v.name,
        );
    }
    Ok(())
}

async fn run_map(config: &AppConfig, variant_id: &str) -> anyhow::Result<()> {
    let mapper = variant_mapper(config)?;

    match mapper.resolve_with_source(variant_id).await {
        Some((provider_id, MappingSource::Static)) => {
            println!("{variant_id} -> {provider_id} (static table)");
        }
        Some((provider_id, MappingSource::SkuMatch)) => {
            println!("{variant_id} -> {provider_id} (SKU match)");
        }
        None => {
            println!("{variant_id} -> no mapping");
        }
    }
    Ok(())
}

async fn run_order(
    config: &AppConfig,
    variant_id: &str,
    image_url: &str,
    email: &str,
    name: &str,
) -> anyhow::Result<()> {
    let mapper = variant_mapper(config)?;
    let Some(sync_variant_id) = mapper.resolve(variant_id).await else {
        anyhow::bail!("no provider mapping for variant {variant_id}");
    };

    let external_id = format!("test-{}", Uuid::new_v4());
    let order = NewOrder {
        external_id: external_id.clone(),
        shipping: "STANDARD".to_owned(),
        recipient: Recipient {
            name: name.to_owned(),
            company: String::new(),
            address1: "123 Test Street".to_owned(),
            address2: String::new(),
            city: "Test City".to_owned(),
            state_code: "CA".to_owned(),
            state_name: "California".to_owned(),
            country_code: "US".to_owned(),
            country_name: "United States".to_owned(),
            zip: "90210".to_owned(),
            phone: String::new(),
            email: email.to_owned(),
        },
        items: vec![OrderItem {
            sync_variant_id,
            quantity: 1,
            retail_price: Decimal::new(2500, 2),
            name: "Test Pet Portrait".to_owned(),
            files: vec![OrderFile {
                file_type: "default".to_owned(),
                url: image_url.to_owned(),
                filename: format!("{external_id}.jpg"),
            }],
        }],
        retail_costs: RetailCosts {
            currency: "USD".to_owned(),
            subtotal: Decimal::new(2500, 2),
            discount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(2500, 2),
        },
    };

    let client = printful_client(config)?;
    let provider_order_id = client.create_order(&order).await?;
    println!("created provider order {provider_order_id} (external_id={external_id})");
    Ok(())
}
