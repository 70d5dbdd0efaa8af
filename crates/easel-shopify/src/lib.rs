pub mod admin;
pub mod error;
pub mod pagination;
pub mod storefront;
pub mod types;

pub use admin::AdminClient;
pub use error::ShopifyError;
pub use storefront::{CartLine, StorefrontClient};
pub use types::{AdminProduct, AdminProductsResponse, AdminVariant};
