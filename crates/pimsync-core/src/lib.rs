pub mod app_config;
pub mod config;
pub mod credentials;
pub mod error;
pub mod items;
pub mod job;
pub mod listing;
pub mod resource;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use credentials::{CatalogCredentials, StoredCatalogSettings, TargetCredentials};
pub use error::{ConfigError, ModelError};
pub use items::{Attribute, Category, Family, Product, ProductValue, SourceItem};
pub use job::{ImportFailure, ImportJob, ImportOutcome, ItemOutcome, ItemStatus, Selection};
pub use listing::{ListingFilter, ListingPage, PageRequest};
pub use resource::ResourceType;
