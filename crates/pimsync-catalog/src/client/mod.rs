//! HTTP client for the catalog's REST API.

mod auth;

use std::time::Duration;

use pimsync_core::{CatalogCredentials, ResourceType};
use reqwest::{Client, Url};
use tokio::sync::OnceCell;

use crate::error::CatalogError;
use crate::types::{CatalogPage, ListResponse};

/// Parameters for one listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<'a> {
    pub resource: ResourceType,
    pub page: u32,
    pub limit: u32,
    /// Comma-separated locale codes restricting localized values.
    pub locales: Option<&'a str>,
    /// JSON-encoded search filter.
    pub search: Option<&'a str>,
}

/// Client for one catalog instance, built per request from stored credentials.
///
/// The access token is requested lazily on the first call and reused for the
/// lifetime of the client. Nothing is retried: a failed call surfaces
/// immediately as a typed [`CatalogError`].
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    credentials: CatalogCredentials,
    token: OnceCell<String>,
}

impl CatalogClient {
    /// Creates a client with the given timeout and `User-Agent`.
    ///
    /// No network traffic happens here.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidBaseUrl`] if `credentials.url` is not an
    ///   absolute `http(s)` URL.
    /// - [`CatalogError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        credentials: CatalogCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let base_url = parse_base_url(&credentials.url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
            token: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches one page of records for `query.resource`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::AuthFailed`] if the token request is refused.
    /// - [`CatalogError::Unauthorized`]: HTTP 401 or 403 on the listing itself.
    /// - [`CatalogError::RateLimited`]: HTTP 429.
    /// - [`CatalogError::NotFound`]: HTTP 404.
    /// - [`CatalogError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`CatalogError::Http`]: network or TLS failure.
    /// - [`CatalogError::Deserialize`] / [`CatalogError::MalformedListing`] -
    ///   body is not a listing envelope.
    pub async fn list_page(&self, query: &ListQuery<'_>) -> Result<CatalogPage, CatalogError> {
        let url = self.listing_url(query)?;
        let token = self.access_token().await?;

        tracing::debug!(
            resource = %query.resource,
            page = query.page,
            limit = query.limit,
            filtered = query.search.is_some(),
            "fetching catalog page"
        );

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let url = url.to_string();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CatalogError::Unauthorized { url });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound { url });
        }

        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<ListResponse>(&body).map_err(|e| {
            CatalogError::Deserialize {
                context: format!("{} page {}", query.resource.plural(), query.page),
                source: e,
            }
        })?;

        parsed
            .into_page()
            .ok_or(CatalogError::MalformedListing { url })
    }

    /// Builds `{base}/api/rest/v1/{resource}?page&limit[&locales][&search]`.
    fn listing_url(&self, query: &ListQuery<'_>) -> Result<Url, CatalogError> {
        let mut url = self.endpoint(&format!("api/rest/v1/{}", query.resource.plural()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("limit", &query.limit.to_string());
            if let Some(locales) = query.locales.filter(|l| !l.trim().is_empty()) {
                pairs.append_pair("locales", locales);
            }
            if let Some(search) = query.search {
                pairs.append_pair("search", search);
            }
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Normalises the configured catalog URL so relative joins append to it.
///
/// `https://pim.example.com` and `https://pim.example.com/` both become
/// `https://pim.example.com/`; a sub-path install keeps its path.
fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }

    Ok(url)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
