//! Integration tests for the per-order fulfillment pipeline and the
//! single-flight behavior of the SKU auto-mapper.
//!
//! Uses `wiremock` in place of the provider and storefront APIs.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use easel_fulfillment::{
    FulfillmentPipeline, ItemStatus, OrderEvent, SubmissionLedger, VariantMap, VariantMapper,
};
use easel_printful::PrintfulClient;
use easel_shopify::AdminClient;

fn printful_client(base: &str) -> Arc<PrintfulClient> {
    Arc::new(
        PrintfulClient::new(base, "test-key", 5, "easel-test/0.1", 0, 0)
            .expect("test PrintfulClient"),
    )
}

/// Pipeline with the static builtin map only (no SKU auto-mapping).
fn static_pipeline(printful_base: &str) -> FulfillmentPipeline {
    let printful = printful_client(printful_base);
    let mapper = Arc::new(VariantMapper::new(
        VariantMap::builtin(),
        None,
        Arc::clone(&printful),
        Duration::from_secs(3600),
    ));
    FulfillmentPipeline::new(mapper, printful, Arc::new(SubmissionLedger::new()))
}

fn three_item_order() -> OrderEvent {
    let body = json!({
        "id": 123,
        "email": "a@x.com",
        "currency": "USD",
        "subtotal_price": "75.00",
        "total_price": "75.00",
        "shipping_address": {
            "first_name": "Jamie", "last_name": "Doe",
            "address1": "123 Main St", "city": "Austin",
            "province_code": "TX", "country_code": "US", "zip": "78701"
        },
        "line_items": [
            {
                "id": 1, "variant_id": "51871373918526", "quantity": 1,
                "price": "25.00", "name": "Canvas",
                "properties": [{"name": "AI_Image_URL", "value": "https://cdn/1.jpg"}]
            },
            {
                "id": 2, "variant_id": "99999999999999", "quantity": 1,
                "price": "25.00", "name": "Mystery item",
                "properties": [{"name": "AI_Image_URL", "value": "https://cdn/2.jpg"}]
            },
            {
                "id": 3, "variant_id": "51871440765246", "quantity": 1,
                "price": "25.00", "name": "Tote bag",
                "properties": [{"name": "_AI_Image_URL", "value": "https://cdn/3.jpg"}]
            }
        ]
    });
    OrderEvent::parse(&serde_json::to_vec(&body).expect("fixture")).expect("parse fixture")
}

#[tokio::test]
async fn unmapped_item_does_not_block_siblings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"result": {"id": 555}})))
        .expect(2) // items 1 and 3; item 2 has no mapping
        .mount(&server)
        .await;

    let pipeline = static_pipeline(&server.uri());
    let report = pipeline.process_order(&three_item_order()).await;

    assert_eq!(report.order_id, 123);
    assert_eq!(report.line_items, 3);
    assert_eq!(report.actionable_items, 3);
    assert_eq!(report.submitted(), 2);
    assert_eq!(
        report.outcomes[0].status,
        ItemStatus::Submitted {
            provider_order_id: 555
        }
    );
    assert_eq!(report.outcomes[1].status, ItemStatus::MappingNotFound);
    assert_eq!(
        report.outcomes[2].status,
        ItemStatus::Submitted {
            provider_order_id: 555
        }
    );
}

#[tokio::test]
async fn external_ids_are_minted_per_line_item() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({"external_id": "123-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"result": {"id": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(json!({"external_id": "123-3"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"result": {"id": 2}})))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = static_pipeline(&server.uri());
    let report = pipeline.process_order(&three_item_order()).await;
    assert_eq!(report.submitted(), 2);
}

#[tokio::test]
async fn redelivered_order_is_detected_as_duplicate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"result": {"id": 555}})))
        .expect(2) // first delivery only; re-delivery makes no provider calls
        .mount(&server)
        .await;

    let pipeline = static_pipeline(&server.uri());
    let order = three_item_order();

    let first = pipeline.process_order(&order).await;
    assert_eq!(first.submitted(), 2);

    let second = pipeline.process_order(&order).await;
    assert_eq!(second.submitted(), 0);
    assert_eq!(second.outcomes[0].status, ItemStatus::Duplicate);
    assert_eq!(
        second.outcomes[1].status,
        ItemStatus::MappingNotFound,
        "unmapped item stays unmapped, not duplicate"
    );
    assert_eq!(second.outcomes[2].status, ItemStatus::Duplicate);
}

#[tokio::test]
async fn failed_submission_is_released_for_retry() {
    let server = MockServer::start().await;

    // First delivery: provider rejects everything.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&json!({
            "error": {"message": "Temporarily out of stock"}
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    // Re-delivery: provider accepts.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"result": {"id": 777}})))
        .mount(&server)
        .await;

    let pipeline = static_pipeline(&server.uri());
    let order = three_item_order();

    let first = pipeline.process_order(&order).await;
    assert_eq!(first.submitted(), 0);
    match &first.outcomes[0].status {
        ItemStatus::SubmissionFailed { message } => {
            assert!(message.contains("Temporarily out of stock"), "got: {message}");
        }
        other => panic!("expected SubmissionFailed, got: {other:?}"),
    }

    let second = pipeline.process_order(&order).await;
    assert_eq!(
        second.submitted(),
        2,
        "failed items must be retryable on re-delivery, not duplicates"
    );
}

// ---------------------------------------------------------------------------
// SKU auto-mapping
// ---------------------------------------------------------------------------

const ADMIN_PRODUCTS_PATH: &str = "/admin/api/2024-01/products.json";

async fn mount_catalogs(shopify: &MockServer, printful: &MockServer, expect_once: bool) {
    let admin_mock = Mock::given(method("GET"))
        .and(path(ADMIN_PRODUCTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "products": [{
                "id": 7,
                "title": "Framed canvas",
                "variants": [{"id": 88_000_001_i64, "sku": "CANVAS-BLK-8X10", "price": "25.00"}]
            }]
        })));
    let admin_mock = if expect_once {
        admin_mock.expect(1)
    } else {
        admin_mock
    };
    admin_mock.mount(shopify).await;

    let list_mock = Mock::given(method("GET"))
        .and(path("/sync/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "result": [{"id": 10, "name": "Framed canvas"}]
        })));
    let list_mock = if expect_once {
        list_mock.expect(1)
    } else {
        list_mock
    };
    list_mock.mount(printful).await;

    Mock::given(method("GET"))
        .and(path("/sync/products/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "result": {
                "sync_product": {"id": 10, "name": "Framed canvas"},
                "sync_variants": [
                    {"id": 4_858_094_038_i64, "name": "Framed canvas / Black / 8x10", "sku": "CANVAS-BLK-8X10"}
                ]
            }
        })))
        .mount(printful)
        .await;
}

fn sku_mapper(shopify_base: &str, printful_base: &str, ttl: Duration) -> VariantMapper {
    let admin = AdminClient::new(shopify_base, "admin-token", 5, "easel-test/0.1", 0, 0)
        .expect("test AdminClient");
    VariantMapper::new(
        VariantMap::builtin(),
        Some(admin),
        printful_client(printful_base),
        ttl,
    )
}

#[tokio::test]
async fn sku_join_resolves_variant_missing_from_static_table() {
    let shopify = MockServer::start().await;
    let printful = MockServer::start().await;
    mount_catalogs(&shopify, &printful, false).await;

    let mapper = sku_mapper(&shopify.uri(), &printful.uri(), Duration::from_secs(3600));

    assert_eq!(mapper.resolve("88000001").await, Some(4_858_094_038));
    assert_eq!(
        mapper
            .resolve("gid://shopify/ProductVariant/88000001")
            .await,
        Some(4_858_094_038),
        "gid form resolves through the cache too"
    );
}

#[tokio::test]
async fn unknown_variant_with_no_sku_match_resolves_to_none_without_error() {
    let shopify = MockServer::start().await;
    let printful = MockServer::start().await;
    mount_catalogs(&shopify, &printful, false).await;

    let mapper = sku_mapper(&shopify.uri(), &printful.uri(), Duration::from_secs(3600));
    assert_eq!(mapper.resolve("424242424242").await, None);
}

#[tokio::test]
async fn concurrent_stale_lookups_trigger_exactly_one_refresh() {
    let shopify = MockServer::start().await;
    let printful = MockServer::start().await;
    mount_catalogs(&shopify, &printful, true).await;

    let mapper = Arc::new(sku_mapper(
        &shopify.uri(),
        &printful.uri(),
        Duration::from_secs(3600),
    ));

    let a = Arc::clone(&mapper);
    let b = Arc::clone(&mapper);
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.resolve("88000001").await }),
        tokio::spawn(async move { b.resolve("88000001").await }),
    );

    assert_eq!(ra.expect("task a"), Some(4_858_094_038));
    assert_eq!(rb.expect("task b"), Some(4_858_094_038));
    // The .expect(1) on the catalog mocks verifies the single refresh.
}

#[tokio::test]
async fn catalog_fetch_failure_falls_through_to_not_found() {
    let shopify = MockServer::start().await;
    let printful = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ADMIN_PRODUCTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&shopify)
        .await;

    let mapper = sku_mapper(&shopify.uri(), &printful.uri(), Duration::from_secs(3600));

    assert_eq!(
        mapper.resolve("88000001").await,
        None,
        "fetch failure must degrade to NotFound, not raise"
    );
    assert_eq!(
        mapper.resolve("51871373918526").await,
        Some(4_858_094_038),
        "static table still resolves while auto-mapping is broken"
    );
}
