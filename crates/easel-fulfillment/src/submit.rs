//! Builds the outbound fulfillment order from one order event + line item.
//!
//! Amounts arrive from the storefront as decimal strings and leave for the
//! provider as decimal strings; `rust_decimal` carries them in between so no
//! precision is lost to float round-tripping. Absent amounts are zero,
//! unparsable amounts are an error for that item.

use rust_decimal::Decimal;

use easel_printful::{NewOrder, OrderFile, OrderItem, Recipient, RetailCosts};

use crate::error::FulfillmentError;
use crate::event::{LineItem, OrderEvent};

/// Currency used when the order omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Shipping method tier requested from the provider.
pub const SHIPPING_STANDARD: &str = "STANDARD";

/// Mints the provider-side reference for one (order, line item) pair.
///
/// Unique per pair, not per order: one provider order is created per line
/// item, and a shared reference would make re-delivered orders impossible to
/// reconcile against already-created sub-orders.
#[must_use]
pub fn external_reference(order_id: i64, line_item_id: i64) -> String {
    format!("{order_id}-{line_item_id}")
}

/// Print-file name attached to the artwork upload.
#[must_use]
pub fn artwork_filename(order_id: i64, line_item_id: i64) -> String {
    format!("pet-portrait-{order_id}-{line_item_id}.jpg")
}

/// Assembles the provider order payload for one actionable line item.
///
/// # Errors
///
/// Returns [`FulfillmentError::InvalidAmount`] when a present amount string
/// does not parse as a decimal.
pub fn build_fulfillment_order(
    event: &OrderEvent,
    item: &LineItem,
    artwork_url: &str,
    email: Option<&str>,
    sync_variant_id: i64,
) -> Result<NewOrder, FulfillmentError> {
    let address = event.shipping_address.clone().unwrap_or_default();

    let name = format!(
        "{} {}",
        address.first_name.as_deref().unwrap_or(""),
        address.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_owned();

    let recipient = Recipient {
        name,
        company: address.company.unwrap_or_default(),
        address1: address.address1.unwrap_or_default(),
        address2: address.address2.unwrap_or_default(),
        city: address.city.unwrap_or_default(),
        state_code: address.province_code.unwrap_or_default(),
        state_name: address.province.unwrap_or_default(),
        country_code: address.country_code.unwrap_or_default(),
        country_name: address.country.unwrap_or_default(),
        zip: address.zip.unwrap_or_default(),
        phone: address
            .phone
            .or_else(|| event.phone.clone())
            .unwrap_or_default(),
        email: event
            .email
            .as_deref()
            .or(email)
            .unwrap_or_default()
            .to_owned(),
    };

    let retail_price = amount("line_items[].price", item.price.as_deref())?;
    let shipping_price = amount(
        "shipping_lines[0].price",
        event
            .shipping_lines
            .first()
            .and_then(|line| line.price.as_deref()),
    )?;

    Ok(NewOrder {
        external_id: external_reference(event.id, item.id),
        shipping: SHIPPING_STANDARD.to_owned(),
        recipient,
        items: vec![OrderItem {
            sync_variant_id,
            quantity: item.quantity,
            retail_price,
            name: item.name.clone().unwrap_or_default(),
            files: vec![OrderFile {
                file_type: "default".to_owned(),
                url: artwork_url.to_owned(),
                filename: artwork_filename(event.id, item.id),
            }],
        }],
        retail_costs: RetailCosts {
            currency: event
                .currency
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            subtotal: amount("subtotal_price", event.subtotal_price.as_deref())?,
            discount: amount("total_discounts", event.total_discounts.as_deref())?,
            shipping: shipping_price,
            tax: amount("total_tax", event.total_tax.as_deref())?,
            total: amount("total_price", event.total_price.as_deref())?,
        },
    })
}

/// Parses a storefront amount string. Absent ⇒ zero.
fn amount(field: &'static str, value: Option<&str>) -> Result<Decimal, FulfillmentError> {
    match value {
        None => Ok(Decimal::ZERO),
        Some(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map_err(|_| FulfillmentError::InvalidAmount {
                field,
                value: raw.to_owned(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::OrderEvent;

    fn sample_event() -> OrderEvent {
        let body = serde_json::json!({
            "id": 123,
            "email": "a@x.com",
            "currency": "USD",
            "subtotal_price": "25.00",
            "total_discounts": "0.00",
            "total_tax": "2.06",
            "total_price": "32.06",
            "shipping_lines": [{"price": "5.00"}],
            "shipping_address": {
                "first_name": "Jamie",
                "last_name": "Doe",
                "address1": "123 Main St",
                "city": "Austin",
                "province": "Texas",
                "province_code": "TX",
                "country": "United States",
                "country_code": "US",
                "zip": "78701"
            },
            "line_items": [{
                "id": 1,
                "variant_id": "51871373918526",
                "quantity": 1,
                "price": "25.00",
                "name": "Canvas",
                "properties": [{"name": "AI_Image_URL", "value": "https://cdn/x.jpg"}]
            }]
        });
        OrderEvent::parse(&serde_json::to_vec(&body).expect("fixture")).expect("parse fixture")
    }

    #[test]
    fn builds_complete_provider_order() {
        let event = sample_event();
        let item = &event.line_items[0];
        let order = build_fulfillment_order(&event, item, "https://cdn/x.jpg", None, 4_858_094_038)
            .expect("build order");

        assert_eq!(order.external_id, "123-1");
        assert_eq!(order.shipping, "STANDARD");
        assert_eq!(order.recipient.name, "Jamie Doe");
        assert_eq!(order.recipient.state_code, "TX");
        assert_eq!(order.recipient.email, "a@x.com");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].sync_variant_id, 4_858_094_038);
        assert_eq!(order.items[0].retail_price.to_string(), "25.00");
        assert_eq!(order.items[0].files[0].filename, "pet-portrait-123-1.jpg");
        assert_eq!(order.retail_costs.currency, "USD");
        assert_eq!(order.retail_costs.shipping.to_string(), "5.00");
        assert_eq!(order.retail_costs.total.to_string(), "32.06");
    }

    #[test]
    fn missing_amounts_default_to_zero_and_currency_to_usd() {
        let body = serde_json::json!({
            "id": 7,
            "line_items": [{"id": 2, "quantity": 1}]
        });
        let event =
            OrderEvent::parse(&serde_json::to_vec(&body).expect("fixture")).expect("parse");
        let order = build_fulfillment_order(
            &event,
            &event.line_items[0],
            "https://cdn/y.jpg",
            Some("fallback@example.com"),
            1,
        )
        .expect("build order");

        assert_eq!(order.retail_costs.currency, "USD");
        assert_eq!(order.retail_costs.subtotal, Decimal::ZERO);
        assert_eq!(order.retail_costs.total, Decimal::ZERO);
        assert_eq!(order.items[0].retail_price, Decimal::ZERO);
        assert_eq!(
            order.recipient.email, "fallback@example.com",
            "property email fills in when the order has none"
        );
    }

    #[test]
    fn unparsable_amount_is_an_error_for_the_item() {
        let body = serde_json::json!({
            "id": 7,
            "total_price": "thirty-two dollars",
            "line_items": [{"id": 2, "quantity": 1}]
        });
        let event =
            OrderEvent::parse(&serde_json::to_vec(&body).expect("fixture")).expect("parse");
        let result =
            build_fulfillment_order(&event, &event.line_items[0], "https://cdn/y.jpg", None, 1);

        match result.unwrap_err() {
            FulfillmentError::InvalidAmount { field, value } => {
                assert_eq!(field, "total_price");
                assert_eq!(value, "thirty-two dollars");
            }
            other => panic!("expected InvalidAmount, got: {other:?}"),
        }
    }

    #[test]
    fn external_reference_is_unique_per_line_item() {
        assert_eq!(external_reference(123, 1), "123-1");
        assert_ne!(external_reference(123, 1), external_reference(123, 2));
    }
}
