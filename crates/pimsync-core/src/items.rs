//! Records returned by the source catalog.
//!
//! Each resource kind keeps only the fields the importer reads; anything else
//! the catalog sends is ignored during deserialization. Labels are keyed by
//! locale code (`en_US`, `nl_NL`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::resource::ResourceType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub code: String,
    /// Catalog attribute type, e.g. `pim_catalog_text`.
    #[serde(rename = "type", default)]
    pub attribute_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_as_label: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Attribute code → per-locale/per-scope values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: BTreeMap<String, Vec<ProductValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductValue {
    pub data: serde_json::Value,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// One catalog record of any resource kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceItem {
    Attribute(Attribute),
    Category(Category),
    Family(Family),
    Product(Product),
}

impl SourceItem {
    /// Parses a raw catalog record as the given resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedItem`] if the record does not have the
    /// shape of `resource` (missing identity field, wrong field types).
    pub fn from_value(resource: ResourceType, value: serde_json::Value) -> Result<Self, ModelError> {
        let malformed = |e: serde_json::Error| ModelError::MalformedItem {
            resource,
            reason: e.to_string(),
        };
        let item = match resource {
            ResourceType::Attribute => {
                SourceItem::Attribute(serde_json::from_value(value).map_err(malformed)?)
            }
            ResourceType::Category => {
                SourceItem::Category(serde_json::from_value(value).map_err(malformed)?)
            }
            ResourceType::Family => {
                SourceItem::Family(serde_json::from_value(value).map_err(malformed)?)
            }
            ResourceType::Product => {
                SourceItem::Product(serde_json::from_value(value).map_err(malformed)?)
            }
        };
        Ok(item)
    }

    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        match self {
            SourceItem::Attribute(_) => ResourceType::Attribute,
            SourceItem::Category(_) => ResourceType::Category,
            SourceItem::Family(_) => ResourceType::Family,
            SourceItem::Product(_) => ResourceType::Product,
        }
    }

    /// The identity key: `code`, or `identifier` for products.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            SourceItem::Attribute(a) => &a.code,
            SourceItem::Category(c) => &c.code,
            SourceItem::Family(f) => &f.code,
            SourceItem::Product(p) => &p.identifier,
        }
    }

    /// Human-readable name in `locale`, falling back to the code.
    #[must_use]
    pub fn display_label(&self, locale: &str) -> &str {
        let label = match self {
            SourceItem::Attribute(a) => localized(&a.labels, locale),
            SourceItem::Category(c) => localized(&c.labels, locale),
            SourceItem::Family(f) => localized(&f.labels, locale),
            SourceItem::Product(p) => p.name(locale),
        };
        label.unwrap_or_else(|| self.code())
    }
}

impl Product {
    /// The product's `name` value.
    ///
    /// Prefers the entry for `locale`; otherwise the first entry whose data is
    /// a non-blank string. Returns `None` when no usable name exists.
    #[must_use]
    pub fn name(&self, locale: &str) -> Option<&str> {
        fn text(v: &ProductValue) -> Option<&str> {
            v.data.as_str().filter(|s| !s.trim().is_empty())
        }

        let entries = self.values.get("name")?;
        entries
            .iter()
            .find(|v| v.locale.as_deref() == Some(locale))
            .and_then(text)
            .or_else(|| entries.iter().find_map(text))
    }
}

fn localized<'a>(labels: &'a BTreeMap<String, String>, locale: &str) -> Option<&'a str> {
    labels
        .get(locale)
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// The catalog sends `null` for empty label maps on some resources.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "items_test.rs"]
mod tests;
