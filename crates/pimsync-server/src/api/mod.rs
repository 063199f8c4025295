mod catalog;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderName, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pimsync_catalog::CatalogClient;
use pimsync_core::{AppConfig, ResourceType};
use pimsync_import::{open_catalog, BulkImporter, FetchError, ImporterSettings, JobRegistry};
use pimsync_shopify::AdminClient;
use reqwest::Url;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::sessions::{SessionStore, ShopSession};

pub const SHOP_HEADER: &str = "x-shop-domain";
pub const SETTINGS_PAGE: &str = "/app/settings";
pub const AUTH_ERROR_PAGE: &str = "/app/catalog-auth-error";

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<AppConfig>,
    pub jobs: JobRegistry,
    /// Fixed GraphQL endpoint used instead of the shop's own domain.
    pub shop_endpoint: Option<Url>,
}

impl AppState {
    pub fn new(sessions: Arc<dyn SessionStore>, config: Arc<AppConfig>) -> Self {
        Self {
            sessions,
            config,
            jobs: JobRegistry::new(),
            shop_endpoint: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_unavailable" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Handler failure: either a JSON error or a redirect to an app page.
#[derive(Debug)]
pub enum ApiFailure {
    Error(ApiError),
    Redirect(&'static str),
}

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        ApiFailure::Error(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::Error(err) => err.into_response(),
            ApiFailure::Redirect(to) => Redirect::to(to).into_response(),
        }
    }
}

/// Shop domain taken from the `x-shop-domain` header.
#[derive(Debug, Clone)]
pub struct ShopDomain(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ShopDomain {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let shop = parts
            .headers
            .get(SHOP_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty());

        shop.map(ShopDomain).ok_or_else(|| {
            let req_id = parts
                .extensions
                .get::<RequestId>()
                .map(|r| r.0.clone())
                .unwrap_or_default();
            ApiError::new(req_id, "bad_request", format!("missing {SHOP_HEADER} header"))
        })
    }
}

pub(super) fn parse_resource(request_id: &str, raw: &str) -> Result<ResourceType, ApiError> {
    raw.parse::<ResourceType>()
        .map_err(|e| ApiError::new(request_id, "not_found", e.to_string()))
}

pub(super) async fn load_session(
    state: &AppState,
    request_id: &str,
    shop: &str,
) -> Result<ShopSession, ApiError> {
    match state.sessions.get(shop).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(ApiError::new(
            request_id,
            "unauthorized",
            format!("shop {shop} is not installed"),
        )),
        Err(e) => Err(map_db_error(request_id.to_owned(), &e)),
    }
}

pub(super) type ShopImporter = BulkImporter<CatalogClient, AdminClient>;

/// Builds the importer for one request from the shop's stored credentials.
/// Incomplete catalog settings redirect to the settings page.
pub(super) fn build_importer(
    state: &AppState,
    request_id: &str,
    session: &ShopSession,
) -> Result<ShopImporter, ApiFailure> {
    let config = &state.config;
    let catalog = open_catalog(
        &session.catalog,
        config.http_timeout_secs,
        &config.http_user_agent,
    )
    .map_err(|e| map_fetch_error(request_id, &e))?;

    let target = match &state.shop_endpoint {
        Some(endpoint) => AdminClient::with_endpoint(
            endpoint.clone(),
            &session.target.access_token,
            config.http_timeout_secs,
            &config.http_user_agent,
        ),
        None => AdminClient::for_shop(
            &session.target,
            &config.shopify_api_version,
            config.http_timeout_secs,
            &config.http_user_agent,
        ),
    }
    .map_err(|e| {
        tracing::error!(shop = %session.target.shop_domain, error = %e, "cannot build shop client");
        ApiError::new(request_id, "internal_error", "cannot reach shop")
    })?;

    Ok(BulkImporter::new(
        catalog,
        target,
        ImporterSettings::from_config(config),
    ))
}

pub(super) fn map_fetch_error(request_id: &str, error: &FetchError) -> ApiFailure {
    match error {
        FetchError::NotConfigured { field } => {
            tracing::info!(field, "catalog settings incomplete; redirecting to settings");
            ApiFailure::Redirect(SETTINGS_PAGE)
        }
        FetchError::AuthFailed(e) => {
            tracing::warn!(error = %e, "catalog login failed; redirecting to auth error page");
            ApiFailure::Redirect(AUTH_ERROR_PAGE)
        }
        FetchError::UpstreamUnavailable(_) | FetchError::MalformedPage(_) => {
            ApiError::new(request_id, "upstream_unavailable", error.to_string()).into()
        }
        FetchError::InvalidRequest(e) => {
            ApiError::new(request_id, "validation_error", e.to_string()).into()
        }
    }
}

pub(super) fn map_db_error(request_id: String, error: &pimsync_db::DbError) -> ApiError {
    if let pimsync_db::DbError::ShopNotFound(shop) = error {
        return ApiError::new(request_id, "not_found", format!("shop {shop} is not installed"));
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(SHOP_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/catalog/{resource}", get(catalog::list_page))
        .route(
            "/api/v1/catalog/{resource}/import",
            post(catalog::import_selected),
        )
        .route(
            "/api/v1/catalog/{resource}/import/single",
            post(catalog::import_single),
        )
        .route(
            "/api/v1/catalog/{resource}/import/status",
            get(catalog::import_status),
        )
        .route(
            "/api/v1/settings",
            get(settings::get_settings).put(settings::save_settings),
        )
        .route("/api/v1/settings/sync", get(settings::get_sync_settings))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.sessions.ping().await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    database: "ok",
                },
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                ),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
