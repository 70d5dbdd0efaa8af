pub mod error;
pub mod event;
pub mod ledger;
pub mod mapper;
pub mod mapping;
pub mod pipeline;
pub mod signature;
pub mod submit;

pub use error::FulfillmentError;
pub use event::{ActionableItem, LineItem, OrderEvent};
pub use ledger::SubmissionLedger;
pub use mapper::{MappingSource, VariantMapper};
pub use mapping::VariantMap;
pub use pipeline::{FulfillmentPipeline, ItemStatus, OrderReport};
pub use signature::WebhookVerifier;
