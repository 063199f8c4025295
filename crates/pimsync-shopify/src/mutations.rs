//! GraphQL documents for the creation mutations.

use serde_json::{json, Value};

use crate::types::CreateRequest;

/// A mutation document plus the names needed to read its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// Top-level field under `data`.
    pub root_field: &'static str,
    /// Field inside the payload that holds the created resource.
    pub result_field: &'static str,
    pub document: &'static str,
}

pub const CREATE_METAFIELD_DEFINITION: Mutation = Mutation {
    root_field: "metafieldDefinitionCreate",
    result_field: "createdDefinition",
    document: "mutation CreateMetafieldDefinition($definition: MetafieldDefinitionInput!) {
  metafieldDefinitionCreate(definition: $definition) {
    createdDefinition { id }
    userErrors { field message code }
  }
}",
};

pub const CREATE_COLLECTION: Mutation = Mutation {
    root_field: "collectionCreate",
    result_field: "collection",
    document: "mutation CollectionCreate($input: CollectionInput!) {
  collectionCreate(input: $input) {
    collection { id }
    userErrors { field message }
  }
}",
};

pub const CREATE_PRODUCT_TYPE: Mutation = Mutation {
    root_field: "productTypeCreate",
    result_field: "productType",
    document: "mutation CreateProductType($name: String!) {
  productTypeCreate(name: $name) {
    productType { id name }
    userErrors { field message }
  }
}",
};

pub const CREATE_PRODUCT: Mutation = Mutation {
    root_field: "productCreate",
    result_field: "product",
    document: "mutation ProductCreate($input: ProductInput!) {
  productCreate(input: $input) {
    product { id }
    userErrors { field message }
  }
}",
};

impl CreateRequest {
    #[must_use]
    pub fn mutation(&self) -> Mutation {
        match self {
            CreateRequest::MetafieldDefinition(_) => CREATE_METAFIELD_DEFINITION,
            CreateRequest::Collection(_) => CREATE_COLLECTION,
            CreateRequest::ProductType { .. } => CREATE_PRODUCT_TYPE,
            CreateRequest::Product(_) => CREATE_PRODUCT,
        }
    }

    #[must_use]
    pub fn variables(&self) -> Value {
        match self {
            CreateRequest::MetafieldDefinition(definition) => json!({ "definition": definition }),
            CreateRequest::Collection(input) => json!({ "input": input }),
            CreateRequest::ProductType { name } => json!({ "name": name }),
            CreateRequest::Product(input) => json!({ "input": input }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollectionInput, ProductInput};

    #[test]
    fn each_document_names_its_root_field() {
        for m in [
            CREATE_METAFIELD_DEFINITION,
            CREATE_COLLECTION,
            CREATE_PRODUCT_TYPE,
            CREATE_PRODUCT,
        ] {
            assert!(m.document.contains(m.root_field), "{} missing", m.root_field);
            assert!(m.document.contains(m.result_field));
            assert!(m.document.contains("userErrors"));
        }
    }

    #[test]
    fn collection_variables_wrap_input() {
        let request = CreateRequest::Collection(CollectionInput {
            title: "Summer Sale".to_owned(),
            handle: "summer-sale".to_owned(),
        });
        assert_eq!(
            request.variables(),
            json!({ "input": { "title": "Summer Sale", "handle": "summer-sale" } })
        );
        assert_eq!(request.mutation(), CREATE_COLLECTION);
    }

    #[test]
    fn product_type_variables_are_flat() {
        let request = CreateRequest::ProductType {
            name: "shoes".to_owned(),
        };
        assert_eq!(request.variables(), json!({ "name": "shoes" }));
    }

    #[test]
    fn product_uses_product_create() {
        let request = CreateRequest::Product(ProductInput {
            title: "Sneaker".to_owned(),
            handle: "sku-1".to_owned(),
        });
        assert_eq!(request.mutation().root_field, "productCreate");
    }
}
