//! Storefront GraphQL client for checkout cart creation.
//!
//! The checkout flow attaches the generated-artwork URL and the customer
//! email to the cart line as attributes; Shopify carries them through to the
//! order webhook as line-item properties (with a leading underscore added for
//! non-displayed attributes — the webhook parser accepts both spellings).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::ShopifyError;

/// Storefront API version used for cart mutations.
const API_VERSION: &str = "2024-01";

const CART_CREATE_MUTATION: &str = r"
mutation cartCreate($input: CartInput!) {
    cartCreate(input: $input) {
        cart {
            id
            checkoutUrl
        }
        userErrors {
            field
            message
        }
    }
}
";

/// One line of a cart-create request.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Fully-qualified merchandise id, `gid://shopify/ProductVariant/<n>`.
    pub merchandise_id: String,
    pub quantity: u32,
    /// Custom attributes carried through checkout onto the order's line item.
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<CartCreateData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CartCreateData {
    #[serde(rename = "cartCreate")]
    cart_create: Option<CartCreatePayload>,
}

#[derive(Debug, Deserialize)]
struct CartCreatePayload {
    cart: Option<Cart>,
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct Cart {
    #[serde(rename = "checkoutUrl")]
    checkout_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
}

/// Client for the public Storefront GraphQL API.
pub struct StorefrontClient {
    client: Client,
    base: String,
    storefront_token: String,
}

impl StorefrontClient {
    /// Creates a `StorefrontClient` against the given store origin.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base: &str,
        storefront_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_owned(),
            storefront_token: storefront_token.to_owned(),
        })
    }

    /// Creates a cart with a single line and returns its checkout URL.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Storefront`] — GraphQL errors, cart user errors, or a
    ///   response without a checkout URL.
    /// - [`ShopifyError::UnexpectedStatus`] — non-2xx HTTP status.
    /// - [`ShopifyError::Deserialize`] — response body is not valid JSON.
    /// - [`ShopifyError::Http`] — network or TLS failure.
    pub async fn create_cart(&self, line: &CartLine) -> Result<String, ShopifyError> {
        let url = format!(
            "{base}/api/{API_VERSION}/graphql.json",
            base = self.base
        );

        let attributes: Vec<serde_json::Value> = line
            .attributes
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect();

        let variables = json!({
            "input": {
                "lines": [{
                    "merchandiseId": line.merchandise_id,
                    "quantity": line.quantity,
                    "attributes": attributes,
                }]
            }
        });

        let response = self
            .client
            .post(&url)
            .header("X-Shopify-Storefront-Access-Token", &self.storefront_token)
            .json(&json!({ "query": CART_CREATE_MUTATION, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<GraphqlResponse>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: format!("cartCreate response from {url}"),
                source: e,
            }
        })?;

        if let Some(error) = parsed.errors.first() {
            return Err(ShopifyError::Storefront {
                message: error.message.clone(),
            });
        }

        let payload = parsed
            .data
            .and_then(|d| d.cart_create)
            .ok_or_else(|| ShopifyError::Storefront {
                message: "cartCreate payload missing from response".to_owned(),
            })?;

        if let Some(error) = payload.user_errors.first() {
            return Err(ShopifyError::Storefront {
                message: error.message.clone(),
            });
        }

        payload
            .cart
            .and_then(|c| c.checkout_url)
            .ok_or_else(|| ShopifyError::Storefront {
                message: "cart created without a checkout URL".to_owned(),
            })
    }
}
