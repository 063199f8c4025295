//! Wire types for the catalog's OAuth and listing endpoints.

use serde::Deserialize;

use crate::pagination::PageLinks;

/// Response from `POST /api/oauth/v1/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Raw listing envelope.
///
/// The REST API nests records under `_embedded.items`; some client libraries
/// and proxies flatten them to a top-level `items`. Both shapes are accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(rename = "_links", default)]
    pub links: PageLinks,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<Embedded>,
    #[serde(default)]
    pub items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Embedded {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

impl ListResponse {
    /// Returns `None` when the body carried neither items shape.
    pub fn into_page(self) -> Option<CatalogPage> {
        let items = match (self.embedded, self.items) {
            (Some(embedded), _) => embedded.items,
            (None, Some(items)) => items,
            (None, None) => return None,
        };
        Some(CatalogPage {
            items,
            links: self.links,
        })
    }
}

/// One page of untyped catalog records plus its navigation links.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<serde_json::Value>,
    pub links: PageLinks,
}
