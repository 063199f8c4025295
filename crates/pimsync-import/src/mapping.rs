//! Per-resource translation of catalog items into shop create requests.

use pimsync_core::{AppConfig, Attribute, Category, Family, Product, SourceItem};
use pimsync_shopify::{
    CollectionInput, CreateRequest, MetafieldDefinitionInput, MetafieldType, OwnerType,
    ProductInput,
};

use crate::error::ImportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSettings {
    /// Locale used to pick attribute and category labels.
    pub label_locale: String,
    /// Namespace for every created metafield definition.
    pub metafield_namespace: String,
}

impl MappingSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            label_locale: config.label_locale.clone(),
            metafield_namespace: config.metafield_namespace.clone(),
        }
    }
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            label_locale: "en_US".to_owned(),
            metafield_namespace: "akeneo".to_owned(),
        }
    }
}

/// Catalog attribute type to metafield type. Unknown types become single-line text.
#[must_use]
pub fn metafield_type(attribute_type: &str) -> MetafieldType {
    match attribute_type {
        "pim_catalog_textarea" => MetafieldType::MultiLineTextField,
        "pim_catalog_number" => MetafieldType::NumberInteger,
        "pim_catalog_boolean" => MetafieldType::Boolean,
        "pim_catalog_date" => MetafieldType::Date,
        _ => MetafieldType::SingleLineTextField,
    }
}

/// Builds the create request for `item`.
///
/// # Errors
///
/// Returns [`ImportError::Validation`] if a required mapped field is blank.
/// Nothing is sent anywhere in that case.
pub fn create_request(
    item: &SourceItem,
    settings: &MappingSettings,
) -> Result<CreateRequest, ImportError> {
    match item {
        SourceItem::Attribute(attribute) => attribute_request(attribute, item, settings),
        SourceItem::Category(category) => category_request(category, item, settings),
        SourceItem::Family(family) => family_request(family),
        SourceItem::Product(product) => product_request(product, item, settings),
    }
}

fn attribute_request(
    attribute: &Attribute,
    item: &SourceItem,
    settings: &MappingSettings,
) -> Result<CreateRequest, ImportError> {
    let key = required("code", &attribute.code)?;
    required("type", &attribute.attribute_type)?;
    let namespace = required("namespace", &settings.metafield_namespace)?;
    let name = required("name", item.display_label(&settings.label_locale))?;

    Ok(CreateRequest::MetafieldDefinition(MetafieldDefinitionInput {
        name,
        namespace,
        key,
        metafield_type: metafield_type(&attribute.attribute_type),
        owner_type: OwnerType::Product,
    }))
}

fn category_request(
    category: &Category,
    item: &SourceItem,
    settings: &MappingSettings,
) -> Result<CreateRequest, ImportError> {
    let handle = required("code", &category.code)?;
    if !category.labels.values().any(|l| !l.trim().is_empty()) {
        return Err(missing("label"));
    }
    let title = required("title", item.display_label(&settings.label_locale))?;
    Ok(CreateRequest::Collection(CollectionInput { title, handle }))
}

fn family_request(family: &Family) -> Result<CreateRequest, ImportError> {
    let name = required("code", &family.code)?;
    Ok(CreateRequest::ProductType { name })
}

fn product_request(
    product: &Product,
    item: &SourceItem,
    settings: &MappingSettings,
) -> Result<CreateRequest, ImportError> {
    let handle = required("identifier", &product.identifier)?;
    let title = required("title", item.display_label(&settings.label_locale))?;
    Ok(CreateRequest::Product(ProductInput { title, handle }))
}

fn required(field: &str, value: &str) -> Result<String, ImportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing(field));
    }
    Ok(trimmed.to_owned())
}

fn missing(field: &str) -> ImportError {
    ImportError::Validation(format!("Missing mandatory information: {field}"))
}

#[cfg(test)]
mod tests {
    use pimsync_core::ResourceType;
    use serde_json::json;

    use super::*;

    fn item(resource: ResourceType, value: serde_json::Value) -> SourceItem {
        SourceItem::from_value(resource, value).expect("valid item")
    }

    #[test]
    fn attribute_types_follow_the_mapping_table() {
        assert_eq!(metafield_type("pim_catalog_text"), MetafieldType::SingleLineTextField);
        assert_eq!(metafield_type("pim_catalog_textarea"), MetafieldType::MultiLineTextField);
        assert_eq!(metafield_type("pim_catalog_number"), MetafieldType::NumberInteger);
        assert_eq!(metafield_type("pim_catalog_boolean"), MetafieldType::Boolean);
        assert_eq!(metafield_type("pim_catalog_date"), MetafieldType::Date);
        assert_eq!(metafield_type("pim_catalog_price_collection"), MetafieldType::SingleLineTextField);
    }

    #[test]
    fn attribute_becomes_metafield_definition() {
        let attribute = item(
            ResourceType::Attribute,
            json!({ "code": "color", "type": "pim_catalog_textarea", "labels": { "en_US": "Colour" } }),
        );
        let request = create_request(&attribute, &MappingSettings::default()).unwrap();
        assert_eq!(
            request,
            CreateRequest::MetafieldDefinition(MetafieldDefinitionInput {
                name: "Colour".to_owned(),
                namespace: "akeneo".to_owned(),
                key: "color".to_owned(),
                metafield_type: MetafieldType::MultiLineTextField,
                owner_type: OwnerType::Product,
            })
        );
    }

    #[test]
    fn attribute_without_label_uses_code_as_name() {
        let attribute = item(
            ResourceType::Attribute,
            json!({ "code": "weight", "type": "pim_catalog_number", "labels": { "de_DE": "Gewicht" } }),
        );
        let CreateRequest::MetafieldDefinition(input) =
            create_request(&attribute, &MappingSettings::default()).unwrap()
        else {
            panic!("expected metafield definition");
        };
        assert_eq!(input.name, "weight");
    }

    #[test]
    fn category_handle_is_code() {
        let category = item(
            ResourceType::Category,
            json!({ "code": "summer-sale", "parent": "master", "labels": { "en_US": "Summer Sale" } }),
        );
        assert_eq!(
            create_request(&category, &MappingSettings::default()).unwrap(),
            CreateRequest::Collection(CollectionInput {
                title: "Summer Sale".to_owned(),
                handle: "summer-sale".to_owned(),
            })
        );
    }

    #[test]
    fn family_name_is_code() {
        let family = item(
            ResourceType::Family,
            json!({ "code": "shoes", "labels": { "en_US": "Shoes" } }),
        );
        assert_eq!(
            create_request(&family, &MappingSettings::default()).unwrap(),
            CreateRequest::ProductType {
                name: "shoes".to_owned()
            }
        );
    }

    #[test]
    fn product_title_prefers_name_value() {
        let product = item(
            ResourceType::Product,
            json!({
                "identifier": "sku-1",
                "values": { "name": [{ "data": "Runner", "locale": "nl_NL", "scope": null }] }
            }),
        );
        assert_eq!(
            create_request(&product, &MappingSettings::default()).unwrap(),
            CreateRequest::Product(ProductInput {
                title: "Runner".to_owned(),
                handle: "sku-1".to_owned(),
            })
        );

        let unnamed = item(ResourceType::Product, json!({ "identifier": "sku-2" }));
        let CreateRequest::Product(input) =
            create_request(&unnamed, &MappingSettings::default()).unwrap()
        else {
            panic!("expected product");
        };
        assert_eq!(input.title, "sku-2");
    }

    #[test]
    fn blank_code_is_a_validation_error() {
        let family = item(ResourceType::Family, json!({ "code": "  " }));
        let err = create_request(&family, &MappingSettings::default()).unwrap_err();
        assert!(matches!(err, ImportError::Validation(ref m) if m.contains("code")));
    }

    #[test]
    fn untyped_attribute_is_a_validation_error() {
        let attribute = item(ResourceType::Attribute, json!({ "code": "color", "type": " " }));
        let err = create_request(&attribute, &MappingSettings::default()).unwrap_err();
        assert!(
            matches!(err, ImportError::Validation(ref m) if m == "Missing mandatory information: type"),
            "got {err:?}"
        );
    }

    #[test]
    fn unlabelled_category_is_a_validation_error() {
        let category = item(ResourceType::Category, json!({ "code": "summer", "labels": {} }));
        let err = create_request(&category, &MappingSettings::default()).unwrap_err();
        assert!(
            matches!(err, ImportError::Validation(ref m) if m == "Missing mandatory information: label"),
            "got {err:?}"
        );
    }

    #[test]
    fn category_labelled_in_other_locale_uses_code_as_title() {
        let category = item(
            ResourceType::Category,
            json!({ "code": "summer", "labels": { "nl_NL": "Zomer" } }),
        );
        let CreateRequest::Collection(input) =
            create_request(&category, &MappingSettings::default()).unwrap()
        else {
            panic!("expected collection");
        };
        assert_eq!(input.title, "summer");
    }

    #[test]
    fn blank_namespace_is_a_validation_error() {
        let attribute = item(
            ResourceType::Attribute,
            json!({ "code": "color", "type": "pim_catalog_text" }),
        );
        let settings = MappingSettings {
            metafield_namespace: String::new(),
            ..MappingSettings::default()
        };
        let err = create_request(&attribute, &settings).unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
    }
}
