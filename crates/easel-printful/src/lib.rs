pub mod client;
pub mod error;
pub mod types;

pub use client::PrintfulClient;
pub use error::PrintfulError;
pub use types::{
    NewOrder, OrderFile, OrderItem, Recipient, RetailCosts, SyncProductDetail, SyncProductSummary,
    SyncVariant,
};
