//! Per-shop session lookup behind a trait so routes can run without Postgres.

use futures::future::BoxFuture;
use pimsync_core::{StoredCatalogSettings, TargetCredentials};
use pimsync_db::DbError;
use sqlx::PgPool;

/// What the routes need to know about an installed shop.
#[derive(Debug, Clone)]
pub struct ShopSession {
    pub target: TargetCredentials,
    pub catalog: StoredCatalogSettings,
}

pub trait SessionStore: Send + Sync {
    fn get<'a>(&'a self, shop: &'a str) -> BoxFuture<'a, Result<Option<ShopSession>, DbError>>;

    fn save_catalog_settings<'a>(
        &'a self,
        shop: &'a str,
        settings: &'a StoredCatalogSettings,
    ) -> BoxFuture<'a, Result<(), DbError>>;

    /// Shops whose catalog settings are complete.
    fn configured_shops(&self) -> BoxFuture<'_, Result<Vec<String>, DbError>>;

    fn ping(&self) -> BoxFuture<'_, Result<(), DbError>>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    fn get<'a>(&'a self, shop: &'a str) -> BoxFuture<'a, Result<Option<ShopSession>, DbError>> {
        Box::pin(async move {
            let row = pimsync_db::get_shop_session(&self.pool, shop).await?;
            Ok(row.map(|row| ShopSession {
                target: row.target_credentials(),
                catalog: row.catalog_settings(),
            }))
        })
    }

    fn save_catalog_settings<'a>(
        &'a self,
        shop: &'a str,
        settings: &'a StoredCatalogSettings,
    ) -> BoxFuture<'a, Result<(), DbError>> {
        Box::pin(pimsync_db::update_catalog_settings(&self.pool, shop, settings))
    }

    fn configured_shops(&self) -> BoxFuture<'_, Result<Vec<String>, DbError>> {
        Box::pin(pimsync_db::list_configured_shops(&self.pool))
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), DbError>> {
        Box::pin(pimsync_db::health_check(&self.pool))
    }
}
