//! `list` and `import` run the same fetch and submit path as the server,
//! against the session stored for `--shop`.

use anyhow::Context;
use pimsync_catalog::CatalogClient;
use pimsync_core::{
    AppConfig, ImportOutcome, ItemStatus, ListingFilter, ListingPage, ResourceType, Selection,
};
use pimsync_import::{open_catalog, BulkImporter, FetchError, ImporterSettings};
use pimsync_shopify::AdminClient;
use sqlx::PgPool;

/// The catalog page a selection is taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageTarget {
    pub resource: ResourceType,
    pub page: u32,
    pub category: Option<String>,
}

impl PageTarget {
    fn filter(&self) -> Option<ListingFilter> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| ListingFilter::Category(c.to_owned()))
    }
}

async fn shop_importer(
    pool: &PgPool,
    config: &AppConfig,
    shop: &str,
) -> anyhow::Result<BulkImporter<CatalogClient, AdminClient>> {
    let shop = shop.trim().to_ascii_lowercase();
    let Some(row) = pimsync_db::get_shop_session(pool, &shop).await? else {
        anyhow::bail!("shop {shop} is not installed");
    };

    let catalog = open_catalog(
        &row.catalog_settings(),
        config.http_timeout_secs,
        &config.http_user_agent,
    )
    .map_err(|e| fetch_failure(&e))?;
    let target = AdminClient::for_shop(
        &row.target_credentials(),
        &config.shopify_api_version,
        config.http_timeout_secs,
        &config.http_user_agent,
    )
    .with_context(|| format!("cannot build admin client for {shop}"))?;

    Ok(BulkImporter::new(
        catalog,
        target,
        ImporterSettings::from_config(config),
    ))
}

fn fetch_failure(error: &FetchError) -> anyhow::Error {
    match error {
        FetchError::NotConfigured { field } => anyhow::anyhow!(
            "catalog settings incomplete: `{field}` is not set; save it in the app settings first"
        ),
        FetchError::AuthFailed(_) => anyhow::anyhow!(
            "the catalog refused the stored credentials; check them in the app settings"
        ),
        other => anyhow::anyhow!("{other}"),
    }
}

pub(crate) async fn run_list(
    pool: &PgPool,
    config: &AppConfig,
    shop: &str,
    resource: ResourceType,
    page: u32,
    category: Option<String>,
) -> anyhow::Result<()> {
    let target = PageTarget {
        resource,
        page,
        category,
    };
    let importer = shop_importer(pool, config, shop).await?;
    let listing = importer
        .fetch_page(target.resource, target.page, target.filter())
        .await
        .map_err(|e| fetch_failure(&e))?;

    for line in render_page(&listing, &config.label_locale) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) async fn run_import(
    pool: &PgPool,
    config: &AppConfig,
    shop: &str,
    target: PageTarget,
    codes: Vec<String>,
) -> anyhow::Result<()> {
    let selection = Selection::new(codes);
    if selection.is_empty() {
        anyhow::bail!("No {} selected", target.resource.plural());
    }

    let importer = shop_importer(pool, config, shop).await?;
    let listing = importer
        .fetch_page(target.resource, target.page, target.filter())
        .await
        .map_err(|e| fetch_failure(&e))?;

    let skipped: Vec<&str> = selection
        .codes()
        .iter()
        .filter(|code| listing.find(code).is_none())
        .map(String::as_str)
        .collect();
    if !skipped.is_empty() {
        tracing::warn!(page = target.page, codes = ?skipped, "selected codes not on page; skipping");
    }

    let job = selection
        .resolve(&listing)
        .with_context(|| format!("none of the selected codes are on page {}", target.page))?;

    let outcome = importer
        .submit_bulk_with_progress(job, |index, total| {
            tracing::info!(index, total, "submitting");
        })
        .await;

    for line in render_outcome(&outcome) {
        println!("{line}");
    }
    if outcome.all_succeeded() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} items failed", outcome.failed_count, outcome.total())
    }
}

fn render_page(listing: &ListingPage, locale: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(listing.items.len() + 1);
    lines.push(format!(
        "{} page {} ({} items)",
        listing.resource.plural(),
        listing.page,
        listing.items.len()
    ));
    for item in &listing.items {
        lines.push(format!("  {:<32} {}", item.code(), item.display_label(locale)));
    }
    let mut nav = Vec::new();
    if let Some(query) = listing.previous_query() {
        nav.push(format!("previous: {query}"));
    }
    if let Some(query) = listing.next_query() {
        nav.push(format!("next: {query}"));
    }
    if !nav.is_empty() {
        lines.push(nav.join("  "));
    }
    lines
}

fn render_outcome(outcome: &ImportOutcome) -> Vec<String> {
    let mut lines: Vec<String> = outcome
        .items
        .iter()
        .map(|item| match &item.status {
            ItemStatus::Success => format!("  ok    {}", item.code),
            ItemStatus::Error { message } => format!("  error {}: {message}", item.code),
        })
        .collect();
    lines.push(outcome.summary());
    lines
}
