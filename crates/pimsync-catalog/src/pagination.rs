//! Page navigation via the catalog's HAL `_links` object.
//!
//! Every listing response carries links to its neighbours when they exist:
//!
//! ```text
//! "_links": {
//!   "self":     { "href": "https://pim.example.com/api/rest/v1/attributes?page=2&limit=10" },
//!   "first":    { "href": "https://pim.example.com/api/rest/v1/attributes?page=1&limit=10" },
//!   "previous": { "href": "https://pim.example.com/api/rest/v1/attributes?page=1&limit=10" },
//!   "next":     { "href": "https://pim.example.com/api/rest/v1/attributes?page=3&limit=10" }
//! }
//! ```
//!
//! Only presence matters to callers; the page number is tracked by the request.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<Link>,
    #[serde(default)]
    pub previous: Option<Link>,
}

impl PageLinks {
    #[must_use]
    pub fn has_next(&self) -> bool {
        has_href(self.next.as_ref())
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        has_href(self.previous.as_ref())
    }
}

/// An empty `href` is treated as an absent link.
fn has_href(link: Option<&Link>) -> bool {
    link.is_some_and(|l| !l.href.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(json: serde_json::Value) -> PageLinks {
        serde_json::from_value(json).expect("links should parse")
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let l = links(serde_json::json!({
            "self": { "href": "https://pim.test/api/rest/v1/attributes?page=2&limit=10" },
            "previous": { "href": "https://pim.test/api/rest/v1/attributes?page=1&limit=10" },
            "next": { "href": "https://pim.test/api/rest/v1/attributes?page=3&limit=10" }
        }));
        assert!(l.has_next());
        assert!(l.has_previous());
    }

    #[test]
    fn first_page_has_no_previous() {
        let l = links(serde_json::json!({
            "first": { "href": "https://pim.test/api/rest/v1/attributes?page=1&limit=10" },
            "next": { "href": "https://pim.test/api/rest/v1/attributes?page=2&limit=10" }
        }));
        assert!(l.has_next());
        assert!(!l.has_previous());
    }

    #[test]
    fn empty_href_counts_as_absent() {
        let l = links(serde_json::json!({ "next": { "href": "" } }));
        assert!(!l.has_next());
    }

    #[test]
    fn missing_links_object_means_single_page() {
        let l = PageLinks::default();
        assert!(!l.has_next());
        assert!(!l.has_previous());
    }
}
