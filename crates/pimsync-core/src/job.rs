//! Selection, bulk import jobs, and their aggregated outcomes.

use serde::Serialize;

use crate::error::ModelError;
use crate::items::SourceItem;
use crate::listing::ListingPage;
use crate::resource::ResourceType;

/// Codes picked from the currently displayed page, in the order they were picked.
///
/// Blank codes are dropped and repeated codes keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    codes: Vec<String>,
}

impl Selection {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into();
            let code = code.trim();
            if code.is_empty() || selected.iter().any(|c| c == code) {
                continue;
            }
            selected.push(code.to_owned());
        }
        Self { codes: selected }
    }

    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Turns the selection into a job using the items of `page`.
    ///
    /// Codes that are not on `page` are skipped; a selection never reaches
    /// across pages.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyJob`] if none of the selected codes are on
    /// the page.
    pub fn resolve(&self, page: &ListingPage) -> Result<ImportJob, ModelError> {
        let items = self
            .codes
            .iter()
            .filter_map(|code| page.find(code).cloned())
            .collect();
        ImportJob::new(page.resource, items)
    }
}

/// A non-empty, single-resource batch of items to create remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportJob {
    resource: ResourceType,
    items: Vec<SourceItem>,
}

impl ImportJob {
    /// # Errors
    ///
    /// - [`ModelError::EmptyJob`] if `items` is empty.
    /// - [`ModelError::ResourceMismatch`] if any item is not a `resource`.
    pub fn new(resource: ResourceType, items: Vec<SourceItem>) -> Result<Self, ModelError> {
        if items.is_empty() {
            return Err(ModelError::EmptyJob(resource));
        }
        if let Some(stray) = items.iter().find(|i| i.resource_type() != resource) {
            return Err(ModelError::ResourceMismatch {
                code: stray.code().to_owned(),
                expected: resource,
                actual: stray.resource_type(),
            });
        }
        Ok(Self { resource, items })
    }

    #[must_use]
    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    #[must_use]
    pub fn items(&self) -> &[SourceItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// A constructed job holds at least one item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn into_items(self) -> Vec<SourceItem> {
        self.items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub code: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl ItemOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ItemStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub code: String,
    pub message: String,
}

/// Per-item results of one job, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub resource: ResourceType,
    pub items: Vec<ItemOutcome>,
    pub succeeded_count: usize,
    pub failed_count: usize,
}

impl ImportOutcome {
    #[must_use]
    pub fn new(resource: ResourceType) -> Self {
        Self {
            resource,
            items: Vec::new(),
            succeeded_count: 0,
            failed_count: 0,
        }
    }

    pub fn record_success(&mut self, code: impl Into<String>) {
        self.succeeded_count += 1;
        self.items.push(ItemOutcome {
            code: code.into(),
            status: ItemStatus::Success,
        });
    }

    pub fn record_failure(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.failed_count += 1;
        self.items.push(ItemOutcome {
            code: code.into(),
            status: ItemStatus::Error {
                message: message.into(),
            },
        });
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed_count == 0
    }

    #[must_use]
    pub fn errors(&self) -> Vec<ImportFailure> {
        self.items
            .iter()
            .filter_map(|item| match &item.status {
                ItemStatus::Success => None,
                ItemStatus::Error { message } => Some(ImportFailure {
                    code: item.code.clone(),
                    message: message.clone(),
                }),
            })
            .collect()
    }

    /// One-line feedback suitable for a toast notification.
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = |n: usize| {
            if n == 1 {
                self.resource.as_str()
            } else {
                self.resource.plural()
            }
        };

        if self.all_succeeded() {
            return format!("Imported {} {}", self.succeeded_count, noun(self.succeeded_count));
        }

        let first = self
            .errors()
            .into_iter()
            .next()
            .map(|f| format!(" ({}: {})", f.code, f.message))
            .unwrap_or_default();
        format!(
            "Imported {} of {} {}; {} failed{first}",
            self.succeeded_count,
            self.total(),
            noun(self.total()),
            self.failed_count,
        )
    }
}
