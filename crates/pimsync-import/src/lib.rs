//! Paginated listing and bulk import from the catalog into a shop.

pub mod error;
pub mod form;
pub mod importer;
pub mod mapping;
pub mod ports;
pub mod state;

pub use error::{FetchError, ImportError};
pub use form::{ItemForm, MISSING_MANDATORY};
pub use importer::{open_catalog, BulkImporter, ImporterSettings};
pub use mapping::{create_request, metafield_type, MappingSettings};
pub use ports::{SourceCatalog, TargetRegistry};
pub use state::{JobAlreadyRunning, JobGuard, JobRegistry, JobState};
