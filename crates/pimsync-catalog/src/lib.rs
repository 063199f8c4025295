pub mod client;
pub mod error;
pub mod pagination;
pub mod types;

pub use client::{CatalogClient, ListQuery};
pub use error::CatalogError;
pub use pagination::{Link, PageLinks};
pub use types::CatalogPage;
