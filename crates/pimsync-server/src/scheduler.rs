//! Background sync scheduler.
//!
//! Every `sync_interval_hours` the scheduler asks a [`SyncTrigger`] to sync
//! each shop whose catalog settings are complete.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::sessions::SessionStore;

/// Starts a catalog sync for one shop.
pub trait SyncTrigger: Send + Sync {
    fn trigger_sync<'a>(&'a self, shop: &'a str) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// Default trigger: records that a sync is due and does nothing else.
pub struct LoggingSyncTrigger;

impl SyncTrigger for LoggingSyncTrigger {
    fn trigger_sync<'a>(&'a self, shop: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tracing::info!(shop, "scheduler: catalog sync due");
            Ok(())
        })
    }
}

/// Six-field cron expression firing at minute 0 every `interval_hours` hours.
#[must_use]
pub fn sync_cron(interval_hours: u32) -> String {
    format!("0 0 */{interval_hours} * * *")
}

/// Builds and starts the scheduler with the periodic sync job.
///
/// The returned handle must be kept alive; dropping it stops the jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    sessions: Arc<dyn SessionStore>,
    trigger: Arc<dyn SyncTrigger>,
    interval_hours: u32,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(sync_cron(interval_hours).as_str(), move |_uuid, _lock| {
        let sessions = Arc::clone(&sessions);
        let trigger = Arc::clone(&trigger);

        Box::pin(async move {
            tracing::info!("scheduler: starting sync round");
            let triggered = run_sync_round(sessions.as_ref(), trigger.as_ref()).await;
            tracing::info!(triggered, "scheduler: sync round complete");
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!(interval_hours, "scheduler started");
    Ok(scheduler)
}

/// Triggers a sync for every configured shop and returns how many succeeded.
///
/// A failing shop is logged and does not stop the round.
pub async fn run_sync_round(sessions: &dyn SessionStore, trigger: &dyn SyncTrigger) -> usize {
    let shops = match sessions.configured_shops().await {
        Ok(shops) => shops,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load configured shops");
            return 0;
        }
    };

    if shops.is_empty() {
        tracing::info!("scheduler: no shops with catalog settings; skipping");
        return 0;
    }

    let mut triggered = 0;
    for shop in &shops {
        match trigger.trigger_sync(shop).await {
            Ok(()) => triggered += 1,
            Err(e) => tracing::error!(shop = %shop, error = %e, "scheduler: sync trigger failed"),
        }
    }
    triggered
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pimsync_core::StoredCatalogSettings;

    use super::*;
    use crate::sessions::memory::MemorySessionStore;

    #[derive(Default)]
    struct RecordingTrigger {
        shops: Mutex<Vec<String>>,
        fail_for: Option<&'static str>,
    }

    impl SyncTrigger for RecordingTrigger {
        fn trigger_sync<'a>(&'a self, shop: &'a str) -> BoxFuture<'a, anyhow::Result<()>> {
            self.shops.lock().unwrap().push(shop.to_owned());
            let fail = self.fail_for == Some(shop);
            Box::pin(async move {
                if fail {
                    anyhow::bail!("sync endpoint unavailable");
                }
                Ok(())
            })
        }
    }

    fn complete_settings() -> StoredCatalogSettings {
        StoredCatalogSettings {
            url: Some("https://pim.example.com".to_owned()),
            client_id: Some("client".to_owned()),
            client_secret: Some("secret".to_owned()),
            username: Some("admin".to_owned()),
            password: Some("password".to_owned()),
        }
    }

    #[test]
    fn cron_expression_uses_interval() {
        assert_eq!(sync_cron(2), "0 0 */2 * * *");
        assert_eq!(sync_cron(12), "0 0 */12 * * *");
    }

    #[tokio::test]
    async fn only_configured_shops_are_triggered() {
        let store = MemorySessionStore::with_shop("a.myshopify.com", complete_settings());
        store.insert("b.myshopify.com", StoredCatalogSettings::default());
        store.insert("c.myshopify.com", complete_settings());
        let trigger = RecordingTrigger::default();

        let triggered = run_sync_round(&store, &trigger).await;

        assert_eq!(triggered, 2);
        assert_eq!(
            *trigger.shops.lock().unwrap(),
            vec!["a.myshopify.com".to_owned(), "c.myshopify.com".to_owned()]
        );
    }

    #[tokio::test]
    async fn failing_shop_does_not_stop_the_round() {
        let store = MemorySessionStore::with_shop("a.myshopify.com", complete_settings());
        store.insert("b.myshopify.com", complete_settings());
        let trigger = RecordingTrigger {
            fail_for: Some("a.myshopify.com"),
            ..RecordingTrigger::default()
        };

        let triggered = run_sync_round(&store, &trigger).await;

        assert_eq!(triggered, 1);
        assert_eq!(trigger.shops.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn logging_trigger_always_succeeds() {
        assert!(LoggingSyncTrigger
            .trigger_sync("demo.myshopify.com")
            .await
            .is_ok());
    }
}
