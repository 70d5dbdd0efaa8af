//! Order webhook payload types and the custom-property parser.
//!
//! ## Observed payload quirks
//!
//! - `variant_id` arrives as a JSON number from the platform itself but as a
//!   string from some replay/test tooling; both are accepted.
//! - Cart attributes added at checkout come back as line-item `properties`,
//!   and Shopify prefixes non-displayed attributes with an underscore. The
//!   same semantic field therefore appears under two spellings depending on
//!   how the cart was built, so each field has an explicit alias list checked
//!   in priority order.
//! - Not every purchased item is a custom portrait: line items without an
//!   artwork-URL property are valid and simply not actionable.

use serde::{Deserialize, Deserializer};

use crate::error::FulfillmentError;

/// Accepted spellings for the generated-artwork URL property, in priority order.
pub const ARTWORK_URL_ALIASES: [&str; 2] = ["AI_Image_URL", "_AI_Image_URL"];

/// Accepted spellings for the submitting-user email property, in priority order.
pub const CUSTOMER_EMAIL_ALIASES: [&str; 2] = ["User_Email", "_User_Email"];

/// One inbound order-created (or order-updated) webhook payload.
///
/// Immutable once parsed; this subsystem never persists it.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEvent {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub subtotal_price: Option<String>,
    #[serde(default)]
    pub total_discounts: Option<String>,
    #[serde(default)]
    pub total_tax: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub province_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub variant_id: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// One `{name, value}` custom property on a line item.
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// One line item that carries an artwork URL, paired with its resolved
/// cross-cutting data. Produced by [`OrderEvent::actionable_items`].
#[derive(Debug)]
pub struct ActionableItem<'a> {
    pub item: &'a LineItem,
    pub artwork_url: &'a str,
    /// Item-level `User_Email` property, falling back to the order email.
    pub email: Option<&'a str>,
}

impl OrderEvent {
    /// Parses the raw webhook body bytes into an order event.
    ///
    /// # Errors
    ///
    /// Returns [`FulfillmentError::BodyParse`] when the body is not valid
    /// JSON or lacks the required fields.
    pub fn parse(raw_body: &[u8]) -> Result<Self, FulfillmentError> {
        serde_json::from_slice(raw_body).map_err(|source| FulfillmentError::BodyParse { source })
    }

    /// Returns, in line-item order, the items carrying an artwork URL.
    ///
    /// Items without one are omitted here but remain on `line_items` for
    /// logging and audit.
    #[must_use]
    pub fn actionable_items(&self) -> Vec<ActionableItem<'_>> {
        self.line_items
            .iter()
            .filter_map(|item| {
                let artwork_url = item.artwork_url()?;
                Some(ActionableItem {
                    item,
                    artwork_url,
                    email: item.customer_email().or(self.email.as_deref()),
                })
            })
            .collect()
    }
}

impl LineItem {
    /// The generated-artwork URL, under any accepted spelling.
    #[must_use]
    pub fn artwork_url(&self) -> Option<&str> {
        self.property(&ARTWORK_URL_ALIASES)
    }

    /// The submitting user's email, under any accepted spelling.
    #[must_use]
    pub fn customer_email(&self) -> Option<&str> {
        self.property(&CUSTOMER_EMAIL_ALIASES)
    }

    /// Looks up the first alias with a non-empty value, in alias priority
    /// order (not property order).
    fn property(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            self.properties
                .iter()
                .find(|p| p.name == *alias)
                .and_then(|p| p.value.as_deref())
                .filter(|v| !v.is_empty())
        })
    }
}

/// Deserializes a field that arrives as either a JSON string or a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_items(items: serde_json::Value) -> OrderEvent {
        let body = serde_json::json!({
            "id": 123,
            "email": "order@example.com",
            "line_items": items,
        });
        OrderEvent::parse(&serde_json::to_vec(&body).expect("serialize fixture"))
            .expect("parse fixture")
    }

    #[test]
    fn parse_rejects_non_json_body() {
        let result = OrderEvent::parse(b"definitely not json");
        assert!(matches!(result, Err(FulfillmentError::BodyParse { .. })));
    }

    #[test]
    fn variant_id_accepts_string_form() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "variant_id": "51871373918526", "quantity": 1}
        ]));
        assert_eq!(
            order.line_items[0].variant_id.as_deref(),
            Some("51871373918526")
        );
    }

    #[test]
    fn variant_id_accepts_numeric_form() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "variant_id": 51_871_373_918_526_i64, "quantity": 1}
        ]));
        assert_eq!(
            order.line_items[0].variant_id.as_deref(),
            Some("51871373918526")
        );
    }

    #[test]
    fn artwork_url_found_under_plain_spelling() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "AI_Image_URL", "value": "https://cdn/x.jpg"}
            ]}
        ]));
        assert_eq!(order.line_items[0].artwork_url(), Some("https://cdn/x.jpg"));
    }

    #[test]
    fn artwork_url_found_under_underscore_spelling() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "_AI_Image_URL", "value": "https://cdn/y.jpg"}
            ]}
        ]));
        assert_eq!(order.line_items[0].artwork_url(), Some("https://cdn/y.jpg"));
    }

    #[test]
    fn plain_spelling_wins_over_underscore_spelling() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "_AI_Image_URL", "value": "https://cdn/underscore.jpg"},
                {"name": "AI_Image_URL", "value": "https://cdn/plain.jpg"}
            ]}
        ]));
        assert_eq!(
            order.line_items[0].artwork_url(),
            Some("https://cdn/plain.jpg")
        );
    }

    #[test]
    fn empty_property_value_is_treated_as_absent() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "AI_Image_URL", "value": ""}
            ]}
        ]));
        assert_eq!(order.line_items[0].artwork_url(), None);
    }

    #[test]
    fn actionable_items_skips_items_without_artwork_but_event_retains_them() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "AI_Image_URL", "value": "https://cdn/1.jpg"}
            ]},
            {"id": 2, "quantity": 1, "properties": [
                {"name": "Gift_Note", "value": "happy birthday"}
            ]},
            {"id": 3, "quantity": 2, "properties": [
                {"name": "_AI_Image_URL", "value": "https://cdn/3.jpg"}
            ]}
        ]));

        let actionable = order.actionable_items();
        assert_eq!(actionable.len(), 2, "item 2 has no artwork URL");
        assert_eq!(actionable[0].item.id, 1);
        assert_eq!(actionable[1].item.id, 3);
        assert_eq!(order.line_items.len(), 3, "event keeps all items for audit");
    }

    #[test]
    fn email_falls_back_to_order_level_email() {
        let order = order_with_items(serde_json::json!([
            {"id": 1, "quantity": 1, "properties": [
                {"name": "AI_Image_URL", "value": "https://cdn/1.jpg"}
            ]},
            {"id": 2, "quantity": 1, "properties": [
                {"name": "AI_Image_URL", "value": "https://cdn/2.jpg"},
                {"name": "_User_Email", "value": "buyer@example.com"}
            ]}
        ]));

        let actionable = order.actionable_items();
        assert_eq!(actionable[0].email, Some("order@example.com"));
        assert_eq!(actionable[1].email, Some("buyer@example.com"));
    }
}
