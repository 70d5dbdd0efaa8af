use thiserror::Error;

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("webhook body is not a valid order event: {source}")]
    BodyParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid amount in {field}: \"{value}\"")]
    InvalidAmount { field: &'static str, value: String },

    #[error("failed to load variant map from {path}: {reason}")]
    MappingTable { path: String, reason: String },

    #[error(
        "webhook secret is required outside development; set EASEL_SHOPIFY_WEBHOOK_SECRET"
    )]
    SecretRequired,

    #[error("provider rejected the fulfillment order: {0}")]
    Provider(#[from] easel_printful::PrintfulError),
}
