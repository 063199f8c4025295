//! Database operations for the `shop_sessions` table.

use chrono::{DateTime, Utc};
use pimsync_core::{StoredCatalogSettings, TargetCredentials};
use sqlx::PgPool;

use crate::DbError;

const COLUMNS: &str = "id, shop, access_token, catalog_url, catalog_client_id, \
                       catalog_client_secret, catalog_username, catalog_password, \
                       created_at, updated_at";

/// A row from the `shop_sessions` table.
#[derive(Clone, sqlx::FromRow)]
pub struct ShopSessionRow {
    pub id: i64,
    pub shop: String,
    pub access_token: String,
    pub catalog_url: Option<String>,
    pub catalog_client_id: Option<String>,
    pub catalog_client_secret: Option<String>,
    pub catalog_username: Option<String>,
    pub catalog_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShopSessionRow {
    #[must_use]
    pub fn catalog_settings(&self) -> StoredCatalogSettings {
        StoredCatalogSettings {
            url: self.catalog_url.clone(),
            client_id: self.catalog_client_id.clone(),
            client_secret: self.catalog_client_secret.clone(),
            username: self.catalog_username.clone(),
            password: self.catalog_password.clone(),
        }
    }

    #[must_use]
    pub fn target_credentials(&self) -> TargetCredentials {
        TargetCredentials {
            shop_domain: self.shop.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

impl std::fmt::Debug for ShopSessionRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSessionRow")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("catalog", &self.catalog_settings())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Returns the session for `shop`, or `None` if the shop never installed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_shop_session(pool: &PgPool, shop: &str) -> Result<Option<ShopSessionRow>, DbError> {
    let row = sqlx::query_as::<_, ShopSessionRow>(&format!(
        "SELECT {COLUMNS} FROM shop_sessions WHERE shop = $1"
    ))
    .bind(shop)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a session for `shop` or replaces its access token.
///
/// Stored catalog settings are left untouched on conflict.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_shop_session(
    pool: &PgPool,
    shop: &str,
    access_token: &str,
) -> Result<ShopSessionRow, DbError> {
    let row = sqlx::query_as::<_, ShopSessionRow>(&format!(
        "INSERT INTO shop_sessions (shop, access_token) \
         VALUES ($1, $2) \
         ON CONFLICT (shop) DO UPDATE \
         SET access_token = EXCLUDED.access_token, updated_at = NOW() \
         RETURNING {COLUMNS}"
    ))
    .bind(shop)
    .bind(access_token)
    .fetch_one(pool)
    .await?;

    tracing::info!(shop, "shop session stored");
    Ok(row)
}

/// Overwrites all five catalog columns for `shop`.
///
/// # Errors
///
/// Returns [`DbError::ShopNotFound`] if no session exists for `shop`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_catalog_settings(
    pool: &PgPool,
    shop: &str,
    settings: &StoredCatalogSettings,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE shop_sessions \
         SET catalog_url = $2, catalog_client_id = $3, catalog_client_secret = $4, \
             catalog_username = $5, catalog_password = $6, updated_at = NOW() \
         WHERE shop = $1",
    )
    .bind(shop)
    .bind(settings.url.as_deref())
    .bind(settings.client_id.as_deref())
    .bind(settings.client_secret.as_deref())
    .bind(settings.username.as_deref())
    .bind(settings.password.as_deref())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::ShopNotFound(shop.to_owned()));
    }
    Ok(())
}

/// Shops whose five catalog fields are all set and non-blank, ordered by shop.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_configured_shops(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let shops = sqlx::query_scalar::<_, String>(
        "SELECT shop FROM shop_sessions \
         WHERE btrim(coalesce(catalog_url, '')) <> '' \
           AND btrim(coalesce(catalog_client_id, '')) <> '' \
           AND btrim(coalesce(catalog_client_secret, '')) <> '' \
           AND btrim(coalesce(catalog_username, '')) <> '' \
           AND btrim(coalesce(catalog_password, '')) <> '' \
         ORDER BY shop",
    )
    .fetch_all(pool)
    .await?;

    Ok(shops)
}
