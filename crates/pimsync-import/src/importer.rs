//! The paginated bulk importer.

use pimsync_catalog::{CatalogClient, ListQuery};
use pimsync_core::{
    AppConfig, ImportJob, ImportOutcome, ListingFilter, ListingPage, PageRequest, ResourceType,
    SourceItem, StoredCatalogSettings,
};

use crate::error::{FetchError, ImportError};
use crate::mapping::{create_request, MappingSettings};
use crate::ports::{SourceCatalog, TargetRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterSettings {
    pub page_size: u32,
    /// Sent as `locales` on product listings.
    pub product_locales: String,
    pub mapping: MappingSettings,
}

impl ImporterSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            product_locales: config.product_locales.clone(),
            mapping: MappingSettings::from_config(config),
        }
    }
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            product_locales: "nl_NL".to_owned(),
            mapping: MappingSettings::default(),
        }
    }
}

/// Validates stored settings and builds a catalog client for them.
///
/// Runs before any network call, so an incomplete configuration never
/// reaches the catalog.
///
/// # Errors
///
/// Returns [`FetchError::NotConfigured`] naming the first missing field, or
/// `url` if the stored URL cannot be used.
pub fn open_catalog(
    settings: &StoredCatalogSettings,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<CatalogClient, FetchError> {
    let credentials = settings
        .validate()
        .map_err(|field| FetchError::NotConfigured { field })?;
    CatalogClient::new(credentials, timeout_secs, user_agent).map_err(|e| {
        tracing::warn!(error = %e, "stored catalog settings are unusable");
        FetchError::NotConfigured { field: "url" }
    })
}

/// Lists one page of catalog records and pushes selected ones to a shop.
///
/// Items in a job are created one at a time in job order. A failing item
/// never stops the job and nothing is retried or rolled back.
pub struct BulkImporter<S, T> {
    catalog: S,
    target: T,
    settings: ImporterSettings,
}

impl<S, T> BulkImporter<S, T>
where
    S: SourceCatalog + Sync,
    T: TargetRegistry + Sync,
{
    pub fn new(catalog: S, target: T, settings: ImporterSettings) -> Self {
        Self {
            catalog,
            target,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ImporterSettings {
        &self.settings
    }

    /// Fetches page `page` of `resource`, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidRequest`] for page 0 or a filter on a
    ///   non-product listing; the catalog is not contacted.
    /// - [`FetchError::AuthFailed`] if the catalog refuses the credentials.
    /// - [`FetchError::UpstreamUnavailable`] / [`FetchError::MalformedPage`]
    ///   if the catalog fails or returns items that do not parse.
    pub async fn fetch_page(
        &self,
        resource: ResourceType,
        page: u32,
        filter: Option<ListingFilter>,
    ) -> Result<ListingPage, FetchError> {
        let request = PageRequest::new(resource, page, self.settings.page_size, filter)
            .map_err(FetchError::InvalidRequest)?;

        let search = request.filter.as_ref().map(ListingFilter::search_json);
        let locales = (resource == ResourceType::Product)
            .then_some(self.settings.product_locales.as_str());
        let query = ListQuery {
            resource,
            page: request.page,
            limit: request.page_size,
            locales,
            search: search.as_deref(),
        };

        let catalog_page = self.catalog.list_page(&query).await.map_err(|e| {
            tracing::warn!(resource = %resource, page, error = %e, "catalog listing failed");
            FetchError::from(e)
        })?;

        let has_next = catalog_page.links.has_next();
        let has_previous = catalog_page.links.has_previous();
        let items = catalog_page
            .items
            .into_iter()
            .map(|value| SourceItem::from_value(resource, value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(FetchError::MalformedPage)?;

        let listing = ListingPage::new(&request, items, has_next, has_previous)
            .map_err(FetchError::MalformedPage)?;

        tracing::debug!(
            resource = %resource,
            page,
            items = listing.items.len(),
            has_next,
            has_previous,
            "catalog page fetched"
        );
        Ok(listing)
    }

    /// Creates one item in the shop.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Validation`] if `item` is not a `resource` or a
    ///   required mapped field is blank; the shop is not contacted.
    /// - [`ImportError::RemoteRejected`] with the first user error reported.
    /// - [`ImportError::TargetUnavailable`] on a transport or protocol failure.
    pub async fn submit_single(
        &self,
        resource: ResourceType,
        item: &SourceItem,
    ) -> Result<(), ImportError> {
        if item.resource_type() != resource {
            return Err(ImportError::Validation(format!(
                "item \"{}\" is a {}, expected {resource}",
                item.code(),
                item.resource_type()
            )));
        }
        let request = create_request(item, &self.settings.mapping)?;
        let result = self.target.create(&request).await?;

        if result.is_success() {
            tracing::debug!(
                code = item.code(),
                created_id = result.created_id.as_deref().unwrap_or("-"),
                "item created"
            );
            return Ok(());
        }

        for ignored in result.user_errors.iter().skip(1) {
            tracing::debug!(
                code = item.code(),
                message = %ignored.message,
                "additional user error not reported"
            );
        }
        let message = result.first_error().unwrap_or_default().to_owned();
        Err(ImportError::RemoteRejected { message })
    }

    /// Submits every item of `job` and aggregates the outcome.
    pub async fn submit_bulk(&self, job: ImportJob) -> ImportOutcome {
        self.submit_bulk_with_progress(job, |_, _| {}).await
    }

    /// Like [`submit_bulk`](Self::submit_bulk), calling `on_progress(i, n)`
    /// before item `i` (1-based) of `n` is submitted.
    pub async fn submit_bulk_with_progress<F>(
        &self,
        job: ImportJob,
        mut on_progress: F,
    ) -> ImportOutcome
    where
        F: FnMut(usize, usize) + Send,
    {
        let resource = job.resource();
        let total = job.len();
        let mut outcome = ImportOutcome::new(resource);
        let items = job.into_items();

        for (index, item) in items.iter().enumerate() {
            on_progress(index + 1, total);
            match self.submit_single(resource, item).await {
                Ok(()) => {
                    tracing::debug!(resource = %resource, code = item.code(), "item created");
                    outcome.record_success(item.code());
                }
                Err(e) => {
                    tracing::warn!(
                        resource = %resource,
                        code = item.code(),
                        error = %e,
                        "item import failed"
                    );
                    outcome.record_failure(item.code(), e.to_string());
                }
            }
        }

        tracing::info!(
            resource = %resource,
            total,
            succeeded = outcome.succeeded_count,
            failed = outcome.failed_count,
            "bulk import finished"
        );
        outcome
    }
}
