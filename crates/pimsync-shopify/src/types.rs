//! Mutation inputs and the shared `{result, userErrors}` payload shape.

use serde::{Deserialize, Serialize};

/// Metafield value types the importer creates definitions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetafieldType {
    SingleLineTextField,
    MultiLineTextField,
    NumberInteger,
    Boolean,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinitionInput {
    pub name: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub metafield_type: MetafieldType,
    pub owner_type: OwnerType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInput {
    pub title: String,
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub title: String,
    pub handle: String,
}

/// One resource to create, already in the Admin API's input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRequest {
    MetafieldDefinition(MetafieldDefinitionInput),
    Collection(CollectionInput),
    ProductType { name: String },
    Product(ProductInput),
}

/// A validation failure reported inside a mutation payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Parsed mutation payload: the created resource's id, or user errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResult {
    pub created_id: Option<String>,
    pub user_errors: Vec<UserError>,
}

impl CreateResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.user_errors.is_empty()
    }

    /// The first reported message; later ones are not surfaced to users.
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.user_errors.first().map(|e| e.message.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MutationPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}
