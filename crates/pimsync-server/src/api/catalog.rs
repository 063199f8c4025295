use axum::{
    extract::{Path, Query, State},
    Extension, Form, Json,
};
use pimsync_core::{ImportJob, ImportOutcome, ListingFilter, ListingPage, ResourceType, SourceItem};
use pimsync_import::{ImportError, ItemForm, JobState};
use serde::{Deserialize, Serialize};

use super::{
    build_importer, load_session, map_fetch_error, parse_resource, ApiError, ApiFailure,
    ApiResponse, AppState, ShopDomain, ShopImporter,
};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ListingParams {
    page: Option<u32>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ListingView {
    #[serde(flatten)]
    page: ListingPage,
    previous_query: Option<String>,
    next_query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ImportRequest {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImportView {
    summary: String,
    #[serde(flatten)]
    outcome: ImportOutcome,
}

#[derive(Debug, Serialize)]
pub(super) struct StatusView {
    resource: ResourceType,
    #[serde(flatten)]
    state: JobState,
}

pub(super) async fn list_page(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
    Path(resource): Path<String>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<ListingView>>, ApiFailure> {
    let resource = parse_resource(&req_id.0, &resource)?;
    let page = params.page.unwrap_or(1);
    let filter = params
        .category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .map(ListingFilter::Category);

    let session = load_session(&state, &req_id.0, &shop).await?;
    let importer = build_importer(&state, &req_id.0, &session)?;

    state.jobs.mark_fetching(&shop, resource, page);
    match importer.fetch_page(resource, page, filter).await {
        Ok(listing) => {
            state.jobs.mark_ready(&shop, resource, page);
            Ok(ApiResponse::new(
                req_id.0,
                ListingView {
                    previous_query: listing.previous_query(),
                    next_query: listing.next_query(),
                    page: listing,
                },
            ))
        }
        Err(e) => {
            state.jobs.mark_idle(&shop, resource);
            Err(map_fetch_error(&req_id.0, &e))
        }
    }
}

pub(super) async fn import_selected(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
    Path(resource): Path<String>,
    Json(body): Json<ImportRequest>,
) -> Result<Json<ApiResponse<ImportView>>, ApiFailure> {
    let resource = parse_resource(&req_id.0, &resource)?;
    if body.items.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("No {} selected", resource.plural()),
        )
        .into());
    }

    let items = body
        .items
        .into_iter()
        .map(|value| SourceItem::from_value(resource, value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let job = ImportJob::new(resource, items)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let session = load_session(&state, &req_id.0, &shop).await?;
    let importer = build_importer(&state, &req_id.0, &session)?;
    let outcome = run_job(&state, &req_id.0, &shop, &importer, job).await?;

    Ok(ApiResponse::new(
        req_id.0,
        ImportView {
            summary: outcome.summary(),
            outcome,
        },
    ))
}

pub(super) async fn import_single(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
    Path(resource): Path<String>,
    Form(form): Form<ItemForm>,
) -> Result<Json<ApiResponse<ImportView>>, ApiFailure> {
    let resource = parse_resource(&req_id.0, &resource)?;
    let item = form
        .into_item(resource, &state.config.label_locale)
        .map_err(|e| validation_error(&req_id.0, &e))?;
    let job = ImportJob::new(resource, vec![item])
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let session = load_session(&state, &req_id.0, &shop).await?;
    let importer = build_importer(&state, &req_id.0, &session)?;
    let outcome = run_job(&state, &req_id.0, &shop, &importer, job).await?;

    Ok(ApiResponse::new(
        req_id.0,
        ImportView {
            summary: outcome.summary(),
            outcome,
        },
    ))
}

pub(super) async fn import_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ShopDomain(shop): ShopDomain,
    Path(resource): Path<String>,
) -> Result<Json<ApiResponse<StatusView>>, ApiFailure> {
    let resource = parse_resource(&req_id.0, &resource)?;
    Ok(ApiResponse::new(
        req_id.0,
        StatusView {
            resource,
            state: state.jobs.state(&shop, resource),
        },
    ))
}

/// Runs `job` under the per-(shop, resource) guard.
async fn run_job(
    state: &AppState,
    request_id: &str,
    shop: &str,
    importer: &ShopImporter,
    job: ImportJob,
) -> Result<ImportOutcome, ApiError> {
    let resource = job.resource();
    let guard = state
        .jobs
        .begin_submit(shop, resource, job.len())
        .map_err(|e| ApiError::new(request_id, "conflict", e.to_string()))?;

    let outcome = importer
        .submit_bulk_with_progress(job, |index, total| guard.progress(index, total))
        .await;
    guard.complete(&outcome);

    tracing::info!(
        shop,
        resource = %resource,
        succeeded = outcome.succeeded_count,
        failed = outcome.failed_count,
        "import request finished"
    );
    Ok(outcome)
}

fn validation_error(request_id: &str, error: &ImportError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}
