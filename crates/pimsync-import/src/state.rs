//! Per-(shop, resource) import job state.
//!
//! `Idle -> Fetching -> Ready -> Submitting(i of n) -> Completed`. Only one
//! submission per shop and resource may be in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pimsync_core::{ImportOutcome, ResourceType};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Fetching { page: u32 },
    Ready { page: u32 },
    Submitting { index: usize, total: usize },
    Completed { succeeded: usize, failed: usize },
}

impl JobState {
    #[must_use]
    pub fn is_submitting(self) -> bool {
        matches!(self, JobState::Submitting { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("an import of {} is already running for {shop}", .resource.plural())]
pub struct JobAlreadyRunning {
    pub shop: String,
    pub resource: ResourceType,
}

type JobKey = (String, ResourceType);

/// Shared registry of job states. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<JobKey, JobState>>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, shop: &str, resource: ResourceType) -> JobState {
        self.lock()
            .get(&(shop.to_owned(), resource))
            .copied()
            .unwrap_or(JobState::Idle)
    }

    /// Records a page fetch; leaves a running submission untouched.
    pub fn mark_fetching(&self, shop: &str, resource: ResourceType, page: u32) {
        self.set_unless_submitting(shop, resource, JobState::Fetching { page });
    }

    pub fn mark_ready(&self, shop: &str, resource: ResourceType, page: u32) {
        self.set_unless_submitting(shop, resource, JobState::Ready { page });
    }

    /// Returns a failed fetch to `Idle`.
    pub fn mark_idle(&self, shop: &str, resource: ResourceType) {
        self.set_unless_submitting(shop, resource, JobState::Idle);
    }

    /// Moves the entry to `Submitting(0 of total)`.
    ///
    /// # Errors
    ///
    /// Returns [`JobAlreadyRunning`] if a submission for the same shop and
    /// resource has not completed yet.
    pub fn begin_submit(
        &self,
        shop: &str,
        resource: ResourceType,
        total: usize,
    ) -> Result<JobGuard, JobAlreadyRunning> {
        let key = (shop.to_owned(), resource);
        let mut jobs = self.lock();
        if jobs.get(&key).is_some_and(|s| s.is_submitting()) {
            return Err(JobAlreadyRunning {
                shop: shop.to_owned(),
                resource,
            });
        }
        jobs.insert(key.clone(), JobState::Submitting { index: 0, total });
        drop(jobs);

        tracing::debug!(shop, resource = %resource, total, "import job started");
        Ok(JobGuard {
            registry: self.clone(),
            key,
            succeeded: 0,
            failed: 0,
        })
    }

    fn set_unless_submitting(&self, shop: &str, resource: ResourceType, state: JobState) {
        let mut jobs = self.lock();
        let entry = jobs.entry((shop.to_owned(), resource)).or_insert(JobState::Idle);
        if !entry.is_submitting() {
            *entry = state;
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobKey, JobState>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held while a submission runs. Dropping it moves the entry to `Completed`,
/// so an aborted handler never leaves a job stuck in `Submitting`.
#[derive(Debug)]
pub struct JobGuard {
    registry: JobRegistry,
    key: JobKey,
    succeeded: usize,
    failed: usize,
}

impl JobGuard {
    pub fn progress(&self, index: usize, total: usize) {
        self.registry
            .lock()
            .insert(self.key.clone(), JobState::Submitting { index, total });
    }

    /// Ends the job with the counts from `outcome`.
    pub fn complete(mut self, outcome: &ImportOutcome) {
        self.succeeded = outcome.succeeded_count;
        self.failed = outcome.failed_count;
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let state = JobState::Completed {
            succeeded: self.succeeded,
            failed: self.failed,
        };
        self.registry.lock().insert(self.key.clone(), state);
        tracing::debug!(
            shop = %self.key.0,
            resource = %self.key.1,
            succeeded = self.succeeded,
            failed = self.failed,
            "import job completed"
        );
    }
}
