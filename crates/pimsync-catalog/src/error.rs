use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog rejected the client credentials (HTTP {status})")]
    AuthFailed { status: u16 },

    #[error("catalog refused the access token for {url}")]
    Unauthorized { url: String },

    #[error("rate limited by catalog (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("listing from {url} has no items collection")]
    MalformedListing { url: String },

    #[error("invalid catalog URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl CatalogError {
    /// `true` when the stored credentials were rejected, as opposed to the
    /// catalog being unreachable or misbehaving.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::AuthFailed { .. } | CatalogError::Unauthorized { .. }
        )
    }
}
