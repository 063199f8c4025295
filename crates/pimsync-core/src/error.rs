use thiserror::Error;

use crate::resource::ResourceType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Violations of the domain model's invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown resource type \"{0}\"")]
    UnknownResource(String),

    #[error("page must be 1 or greater, got {0}")]
    InvalidPage(u32),

    #[error("category filter is only supported for products, not {0}")]
    FilterNotSupported(ResourceType),

    #[error("import job for {0} must contain at least one item")]
    EmptyJob(ResourceType),

    #[error("item \"{code}\" is a {actual}, expected {expected}")]
    ResourceMismatch {
        code: String,
        expected: ResourceType,
        actual: ResourceType,
    },

    #[error("duplicate code \"{code}\" in {resource} page")]
    DuplicateCode { resource: ResourceType, code: String },

    #[error("malformed {resource} item: {reason}")]
    MalformedItem {
        resource: ResourceType,
        reason: String,
    },
}
