//! Building a single catalog item from submitted form fields.

use std::collections::BTreeMap;

use pimsync_core::{Attribute, Category, Family, Product, ProductValue, ResourceType, SourceItem};
use serde::Deserialize;

use crate::error::ImportError;

pub const MISSING_MANDATORY: &str = "Missing mandatory information";

/// Fields of the single-item import form. Which ones are required depends
/// on the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub attribute_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ItemForm {
    /// Builds the item, labelled in `locale`.
    ///
    /// Required: attribute `code`, `type`, `label`; category `code`, `label`;
    /// family `code`; product `identifier`, `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Validation`] with [`MISSING_MANDATORY`] if any
    /// required field is absent or blank.
    pub fn into_item(self, resource: ResourceType, locale: &str) -> Result<SourceItem, ImportError> {
        let item = match resource {
            ResourceType::Attribute => SourceItem::Attribute(Attribute {
                code: filled(self.code)?,
                attribute_type: filled(self.attribute_type)?,
                labels: labels(locale, filled(self.label)?),
                group: None,
            }),
            ResourceType::Category => SourceItem::Category(Category {
                code: filled(self.code)?,
                parent: None,
                labels: labels(locale, filled(self.label)?),
            }),
            ResourceType::Family => SourceItem::Family(Family {
                code: filled(self.code)?,
                attribute_as_label: None,
                labels: BTreeMap::new(),
            }),
            ResourceType::Product => {
                let identifier = filled(self.identifier)?;
                let name = filled(self.name)?;
                let values = BTreeMap::from([(
                    "name".to_owned(),
                    vec![ProductValue {
                        data: serde_json::Value::String(name),
                        locale: Some(locale.to_owned()),
                        scope: None,
                    }],
                )]);
                SourceItem::Product(Product {
                    identifier,
                    family: None,
                    categories: Vec::new(),
                    enabled: None,
                    values,
                })
            }
        };
        Ok(item)
    }
}

fn filled(value: Option<String>) -> Result<String, ImportError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ImportError::Validation(MISSING_MANDATORY.to_owned()))
}

fn labels(locale: &str, label: String) -> BTreeMap<String, String> {
    BTreeMap::from([(locale.to_owned(), label)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> ItemForm {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String((*v).to_owned())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).expect("form fields")
    }

    #[test]
    fn attribute_form_requires_type_and_label() {
        let err = form(&[("code", "color"), ("type", "pim_catalog_text")])
            .into_item(ResourceType::Attribute, "en_US")
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_MANDATORY);

        let item = form(&[("code", "color"), ("type", "pim_catalog_text"), ("label", "Color")])
            .into_item(ResourceType::Attribute, "en_US")
            .unwrap();
        assert_eq!(item.code(), "color");
        assert_eq!(item.display_label("en_US"), "Color");
    }

    #[test]
    fn category_form_requires_label() {
        let err = form(&[("code", "summer")])
            .into_item(ResourceType::Category, "en_US")
            .unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
    }

    #[test]
    fn family_form_needs_only_code() {
        let item = form(&[("code", "shoes")])
            .into_item(ResourceType::Family, "en_US")
            .unwrap();
        assert_eq!(item.resource_type(), ResourceType::Family);
    }

    #[test]
    fn product_form_stores_name_value() {
        let item = form(&[("identifier", "sku-1"), ("name", "Runner")])
            .into_item(ResourceType::Product, "nl_NL")
            .unwrap();
        let SourceItem::Product(product) = item else {
            panic!("expected product");
        };
        assert_eq!(product.name("nl_NL"), Some("Runner"));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let err = form(&[("identifier", "sku-1"), ("name", "   ")])
            .into_item(ResourceType::Product, "nl_NL")
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_MANDATORY);
    }
}
