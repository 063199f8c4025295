use pimsync_catalog::CatalogError;
use pimsync_core::ModelError;
use pimsync_shopify::ShopifyError;
use thiserror::Error;

/// Failure to produce a listing page. Always terminal for the request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog is not configured: {field} is missing")]
    NotConfigured { field: &'static str },

    #[error("catalog rejected the stored credentials: {0}")]
    AuthFailed(#[source] CatalogError),

    #[error("catalog unavailable: {0}")]
    UpstreamUnavailable(#[source] CatalogError),

    #[error("catalog returned a malformed page: {0}")]
    MalformedPage(#[source] ModelError),

    #[error(transparent)]
    InvalidRequest(ModelError),
}

impl From<CatalogError> for FetchError {
    fn from(err: CatalogError) -> Self {
        if err.is_auth_failure() {
            FetchError::AuthFailed(err)
        } else {
            FetchError::UpstreamUnavailable(err)
        }
    }
}

/// Item-level import failure. The `Display` text is what ends up in the
/// item's outcome entry.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    RemoteRejected { message: String },

    #[error("shop unavailable: {0}")]
    TargetUnavailable(#[from] ShopifyError),
}
