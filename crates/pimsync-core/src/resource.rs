//! The four catalog resource kinds the importer can move between systems.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Attribute,
    Category,
    Family,
    Product,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Attribute,
        ResourceType::Category,
        ResourceType::Family,
        ResourceType::Product,
    ];

    /// Singular lowercase name, e.g. `"attribute"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Attribute => "attribute",
            ResourceType::Category => "category",
            ResourceType::Family => "family",
            ResourceType::Product => "product",
        }
    }

    /// Plural collection name used in catalog endpoints and route paths.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            ResourceType::Attribute => "attributes",
            ResourceType::Category => "categories",
            ResourceType::Family => "families",
            ResourceType::Product => "products",
        }
    }

    /// Name of the identity field on the catalog's wire representation.
    #[must_use]
    pub fn identity_field(self) -> &'static str {
        match self {
            ResourceType::Product => "identifier",
            _ => "code",
        }
    }

    /// Whether listings of this resource accept a category filter.
    #[must_use]
    pub fn supports_category_filter(self) -> bool {
        matches!(self, ResourceType::Product)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ModelError;

    /// Accepts singular or plural names, plus `product-families` as an alias
    /// for families.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attribute" | "attributes" => Ok(ResourceType::Attribute),
            "category" | "categories" => Ok(ResourceType::Category),
            "family" | "families" | "product-families" => Ok(ResourceType::Family),
            "product" | "products" => Ok(ResourceType::Product),
            _ => Err(ModelError::UnknownResource(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural_names() {
        assert_eq!("attributes".parse(), Ok(ResourceType::Attribute));
        assert_eq!("Category".parse(), Ok(ResourceType::Category));
        assert_eq!("product-families".parse(), Ok(ResourceType::Family));
        assert_eq!("products".parse(), Ok(ResourceType::Product));
    }

    #[test]
    fn rejects_unknown_resource() {
        let err = "channels".parse::<ResourceType>().unwrap_err();
        assert_eq!(err, ModelError::UnknownResource("channels".to_owned()));
    }

    #[test]
    fn only_products_accept_category_filter() {
        let filterable: Vec<_> = ResourceType::ALL
            .into_iter()
            .filter(|r| r.supports_category_filter())
            .collect();
        assert_eq!(filterable, vec![ResourceType::Product]);
    }

    #[test]
    fn products_are_keyed_by_identifier() {
        assert_eq!(ResourceType::Product.identity_field(), "identifier");
        assert_eq!(ResourceType::Family.identity_field(), "code");
    }
}
