//! One page of a catalog listing and the request that produced it.

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::error::ModelError;
use crate::items::SourceItem;
use crate::resource::ResourceType;

/// Unreserved characters (RFC 3986) stay readable in navigation links.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Restricts a listing to a subset of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "lowercase")]
pub enum ListingFilter {
    /// Products classified in the given category code.
    Category(String),
}

impl ListingFilter {
    /// JSON-encoded catalog `search` parameter for this filter.
    ///
    /// For `Category("summer-sale")` this is
    /// `{"categories":[{"operator":"IN","value":["summer-sale"]}]}`.
    #[must_use]
    pub fn search_json(&self) -> String {
        match self {
            ListingFilter::Category(code) => serde_json::json!({
                "categories": [{ "operator": "IN", "value": [code] }]
            })
            .to_string(),
        }
    }

    fn query_prefix(&self) -> String {
        match self {
            ListingFilter::Category(code) => {
                format!("category={}&", utf8_percent_encode(code, QUERY_VALUE))
            }
        }
    }
}

/// A validated request for one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub resource: ResourceType,
    pub page: u32,
    pub page_size: u32,
    pub filter: Option<ListingFilter>,
}

impl PageRequest {
    /// # Errors
    ///
    /// - [`ModelError::InvalidPage`] if `page` is 0.
    /// - [`ModelError::FilterNotSupported`] if a filter is given for a
    ///   resource that cannot be filtered.
    pub fn new(
        resource: ResourceType,
        page: u32,
        page_size: u32,
        filter: Option<ListingFilter>,
    ) -> Result<Self, ModelError> {
        if page == 0 {
            return Err(ModelError::InvalidPage(page));
        }
        if filter.is_some() && !resource.supports_category_filter() {
            return Err(ModelError::FilterNotSupported(resource));
        }
        Ok(Self {
            resource,
            page,
            page_size,
            filter,
        })
    }
}

/// One fetched page. Built per request and never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub resource: ResourceType,
    pub page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ListingFilter>,
    pub items: Vec<SourceItem>,
}

impl ListingPage {
    /// # Errors
    ///
    /// - [`ModelError::ResourceMismatch`] if an item is not of the requested kind.
    /// - [`ModelError::DuplicateCode`] if two items share a code.
    pub fn new(
        request: &PageRequest,
        items: Vec<SourceItem>,
        has_next: bool,
        has_previous: bool,
    ) -> Result<Self, ModelError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.resource_type() != request.resource {
                return Err(ModelError::ResourceMismatch {
                    code: item.code().to_owned(),
                    expected: request.resource,
                    actual: item.resource_type(),
                });
            }
            if !seen.insert(item.code()) {
                return Err(ModelError::DuplicateCode {
                    resource: request.resource,
                    code: item.code().to_owned(),
                });
            }
        }

        Ok(Self {
            resource: request.resource,
            page: request.page,
            has_next,
            has_previous,
            filter: request.filter.clone(),
            items,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn find(&self, code: &str) -> Option<&SourceItem> {
        self.items.iter().find(|item| item.code() == code)
    }

    /// Query string for the previous page, keeping any active filter.
    #[must_use]
    pub fn previous_query(&self) -> Option<String> {
        self.has_previous
            .then(|| self.page_query(self.page.saturating_sub(1).max(1)))
    }

    /// Query string for the next page, keeping any active filter.
    #[must_use]
    pub fn next_query(&self) -> Option<String> {
        self.has_next
            .then(|| self.page_query(self.page.saturating_add(1)))
    }

    fn page_query(&self, page: u32) -> String {
        let prefix = self
            .filter
            .as_ref()
            .map(ListingFilter::query_prefix)
            .unwrap_or_default();
        format!("?{prefix}page={page}")
    }
}
