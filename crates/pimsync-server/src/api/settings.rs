use axum::{extract::State, Extension, Json};
use pimsync_core::StoredCatalogSettings;
use serde::{Deserialize, Serialize};

use super::{load_session, map_db_error, ApiError, ApiResponse, AppState, ShopDomain};
use crate::middleware::RequestId;

pub(super) const SAVED_MESSAGE: &str = "Settings saved!";

/// Catalog settings as shown to the merchant; secrets are only flagged.
#[derive(Debug, Serialize)]
pub(super) struct SettingsView {
    url: Option<String>,
    client_id: Option<String>,
    username: Option<String>,
    client_secret_set: bool,
    password_set: bool,
    missing: Vec<&'static str>,
}

impl From<&StoredCatalogSettings> for SettingsView {
    fn from(settings: &StoredCatalogSettings) -> Self {
        let is_set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        Self {
            url: settings.url.clone(),
            client_id: settings.client_id.clone(),
            username: settings.username.clone(),
            client_secret_set: is_set(&settings.client_secret),
            password_set: is_set(&settings.password),
            missing: settings.missing_fields(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SettingsInput {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl SettingsInput {
    /// Blank or absent secrets keep `stored`, since the view never returns them.
    /// Other fields are replaced as sent.
    fn merge_into(self, stored: &StoredCatalogSettings) -> StoredCatalogSettings {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        };
        StoredCatalogSettings {
            url: clean(self.url),
            client_id: clean(self.client_id),
            client_secret: clean(self.client_secret).or_else(|| stored.client_secret.clone()),
            username: clean(self.username),
            password: clean(self.password).or_else(|| stored.password.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SavedView {
    message: &'static str,
    missing: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncView {
    interval_hours: u32,
}

pub(super) async fn get_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
) -> Result<Json<ApiResponse<SettingsView>>, ApiError> {
    let session = load_session(&state, &req_id.0, &shop).await?;
    Ok(ApiResponse::new(
        req_id.0,
        SettingsView::from(&session.catalog),
    ))
}

pub(super) async fn save_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
    Json(input): Json<SettingsInput>,
) -> Result<Json<ApiResponse<SavedView>>, ApiError> {
    let stored = state
        .sessions
        .get(&shop)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("shop {shop} is not installed"),
            )
        })?;

    let settings = input.merge_into(&stored.catalog);
    state
        .sessions
        .save_catalog_settings(&shop, &settings)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let missing = settings.missing_fields();
    tracing::info!(shop, missing = missing.len(), "catalog settings saved");
    Ok(ApiResponse::new(
        req_id.0,
        SavedView {
            message: SAVED_MESSAGE,
            missing,
        },
    ))
}

pub(super) async fn get_sync_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SyncView>> {
    ApiResponse::new(
        req_id.0,
        SyncView {
            interval_hours: state.config.sync_interval_hours,
        },
    )
}
