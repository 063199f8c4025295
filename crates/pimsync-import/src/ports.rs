//! Collaborator seams for the importer.
//!
//! The real clients implement these directly; tests substitute in-memory fakes.

use std::future::Future;

use pimsync_catalog::{CatalogClient, CatalogError, CatalogPage, ListQuery};
use pimsync_shopify::{AdminClient, CreateRequest, CreateResult, ShopifyError};

/// Paged, read-only access to catalog records.
pub trait SourceCatalog {
    fn list_page(
        &self,
        query: &ListQuery<'_>,
    ) -> impl Future<Output = Result<CatalogPage, CatalogError>> + Send;
}

/// One create call per item against the shop.
pub trait TargetRegistry {
    fn create(
        &self,
        request: &CreateRequest,
    ) -> impl Future<Output = Result<CreateResult, ShopifyError>> + Send;
}

impl SourceCatalog for CatalogClient {
    async fn list_page(&self, query: &ListQuery<'_>) -> Result<CatalogPage, CatalogError> {
        CatalogClient::list_page(self, query).await
    }
}

impl TargetRegistry for AdminClient {
    async fn create(&self, request: &CreateRequest) -> Result<CreateResult, ShopifyError> {
        AdminClient::create(self, request).await
    }
}

impl<C: SourceCatalog + Sync> SourceCatalog for &C {
    fn list_page(
        &self,
        query: &ListQuery<'_>,
    ) -> impl Future<Output = Result<CatalogPage, CatalogError>> + Send {
        (**self).list_page(query)
    }
}

impl<R: TargetRegistry + Sync> TargetRegistry for &R {
    fn create(
        &self,
        request: &CreateRequest,
    ) -> impl Future<Output = Result<CreateResult, ShopifyError>> + Send {
        (**self).create(request)
    }
}
