//! Shopify Admin GraphQL client for the four resource-creation mutations the
//! importer needs.

pub mod client;
pub mod error;
pub mod mutations;
pub mod types;

pub use client::AdminClient;
pub use error::ShopifyError;
pub use types::{
    CollectionInput, CreateRequest, CreateResult, MetafieldDefinitionInput, MetafieldType,
    OwnerType, ProductInput, UserError,
};
