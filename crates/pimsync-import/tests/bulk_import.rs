//! Importer behaviour against in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pimsync_catalog::{CatalogError, CatalogPage, Link, ListQuery, PageLinks};
use pimsync_core::{ImportJob, ItemStatus, ListingFilter, ResourceType, Selection, SourceItem};
use pimsync_import::{
    BulkImporter, FetchError, ImportError, ImporterSettings, SourceCatalog, TargetRegistry,
};
use pimsync_shopify::{CreateRequest, CreateResult, ShopifyError, UserError};
use serde_json::{json, Value};

/// Serves fixed pages of attributes and records every query it sees.
#[derive(Default)]
struct FakeCatalog {
    pages: HashMap<u32, Vec<Value>>,
    last_page: u32,
    seen: Mutex<Vec<(ResourceType, u32, Option<String>, Option<String>)>>,
    fail_with_status: Option<u16>,
}

impl FakeCatalog {
    fn with_attribute_pages(pages: &[&[&str]]) -> Self {
        let mut fake = Self::default();
        for (i, codes) in pages.iter().enumerate() {
            let page = u32::try_from(i + 1).unwrap();
            fake.pages.insert(
                page,
                codes
                    .iter()
                    .map(|c| json!({ "code": c, "type": "pim_catalog_text", "labels": {} }))
                    .collect(),
            );
            fake.last_page = page;
        }
        fake
    }
}

impl SourceCatalog for FakeCatalog {
    async fn list_page(&self, query: &ListQuery<'_>) -> Result<CatalogPage, CatalogError> {
        self.seen.lock().unwrap().push((
            query.resource,
            query.page,
            query.locales.map(str::to_owned),
            query.search.map(str::to_owned),
        ));
        if let Some(status) = self.fail_with_status {
            return Err(CatalogError::UnexpectedStatus {
                status,
                url: "https://pim.test/api/rest/v1/attributes".to_owned(),
            });
        }
        let link = |page: u32| Link {
            href: format!("https://pim.test/api/rest/v1/attributes?page={page}&limit=10"),
        };
        Ok(CatalogPage {
            items: self.pages.get(&query.page).cloned().unwrap_or_default(),
            links: PageLinks {
                next: (query.page < self.last_page).then(|| link(query.page + 1)),
                previous: (query.page > 1).then(|| link(query.page - 1)),
            },
        })
    }
}

/// Accepts every create except for codes mapped to a rejection message.
#[derive(Default)]
struct FakeRegistry {
    rejections: HashMap<String, Vec<String>>,
    unavailable: bool,
    calls: AtomicUsize,
    created: Mutex<Vec<CreateRequest>>,
}

impl FakeRegistry {
    fn rejecting(code: &str, messages: &[&str]) -> Self {
        Self {
            rejections: HashMap::from([(
                code.to_owned(),
                messages.iter().map(|m| (*m).to_owned()).collect(),
            )]),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn request_key(request: &CreateRequest) -> String {
    match request {
        CreateRequest::MetafieldDefinition(input) => input.key.clone(),
        CreateRequest::Collection(input) => input.handle.clone(),
        CreateRequest::ProductType { name } => name.clone(),
        CreateRequest::Product(input) => input.handle.clone(),
    }
}

impl TargetRegistry for FakeRegistry {
    async fn create(&self, request: &CreateRequest) -> Result<CreateResult, ShopifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ShopifyError::UnexpectedStatus {
                status: 503,
                url: "https://demo.myshopify.com/admin/api/2025-01/graphql.json".to_owned(),
            });
        }
        self.created.lock().unwrap().push(request.clone());
        let user_errors = self
            .rejections
            .get(&request_key(request))
            .map(|messages| {
                messages
                    .iter()
                    .map(|m| UserError {
                        field: None,
                        message: m.clone(),
                        code: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(CreateResult {
            created_id: None,
            user_errors,
        })
    }
}

fn importer<'a>(
    catalog: &'a FakeCatalog,
    registry: &'a FakeRegistry,
) -> BulkImporter<&'a FakeCatalog, &'a FakeRegistry> {
    BulkImporter::new(catalog, registry, ImporterSettings::default())
}

fn attribute(code: &str) -> SourceItem {
    SourceItem::from_value(
        ResourceType::Attribute,
        json!({ "code": code, "type": "pim_catalog_text" }),
    )
    .unwrap()
}

#[tokio::test]
async fn selected_subset_is_imported_in_order_with_first_error() {
    let catalog = FakeCatalog::with_attribute_pages(&[&["a", "b", "c"]]);
    let registry = FakeRegistry::rejecting("c", &["Key already taken", "Name is too long"]);
    let importer = importer(&catalog, &registry);

    let page = importer
        .fetch_page(ResourceType::Attribute, 1, None)
        .await
        .expect("page 1");
    let job = Selection::new(["a", "c"]).resolve(&page).expect("job");
    let outcome = importer.submit_bulk(job).await;

    assert_eq!(outcome.succeeded_count, 1);
    assert_eq!(outcome.failed_count, 1);
    assert_eq!(outcome.items[0].code, "a");
    assert!(outcome.items[0].is_success());
    assert_eq!(outcome.items[1].code, "c");
    assert_eq!(
        outcome.items[1].status,
        ItemStatus::Error {
            message: "Key already taken".to_owned()
        }
    );
    assert_eq!(registry.calls(), 2);
}

#[tokio::test]
async fn every_item_gets_an_outcome_despite_failures() {
    let catalog = FakeCatalog::default();
    let mut registry = FakeRegistry::rejecting("b", &["Key already taken"]);
    registry
        .rejections
        .insert("d".to_owned(), vec!["Name is invalid".to_owned()]);
    let importer = importer(&catalog, &registry);

    let codes = ["a", "b", "c", "d", "e"];
    let job = ImportJob::new(
        ResourceType::Attribute,
        codes.iter().map(|c| attribute(c)).collect(),
    )
    .unwrap();

    let mut progress = Vec::new();
    let outcome = importer
        .submit_bulk_with_progress(job, |i, n| progress.push((i, n)))
        .await;

    assert_eq!(outcome.total(), 5);
    assert_eq!(outcome.succeeded_count + outcome.failed_count, 5);
    assert_eq!(outcome.failed_count, 2);
    let order: Vec<&str> = outcome.items.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(order, codes);
    assert_eq!(progress, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    assert_eq!(registry.calls(), 5);
}

#[tokio::test]
async fn unavailable_shop_fails_items_without_stopping() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry {
        unavailable: true,
        ..FakeRegistry::default()
    };
    let importer = importer(&catalog, &registry);

    let job = ImportJob::new(
        ResourceType::Attribute,
        vec![attribute("a"), attribute("b")],
    )
    .unwrap();
    let outcome = importer.submit_bulk(job).await;

    assert_eq!(outcome.failed_count, 2);
    assert_eq!(registry.calls(), 2);
    let errors = outcome.errors();
    assert!(errors[0].message.starts_with("shop unavailable"), "{}", errors[0].message);
}

#[tokio::test]
async fn resubmitting_creates_again() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);
    let job = ImportJob::new(ResourceType::Attribute, vec![attribute("color")]).unwrap();

    let first = importer.submit_bulk(job.clone()).await;
    let second = importer.submit_bulk(job).await;

    assert!(first.all_succeeded());
    assert!(second.all_succeeded());
    assert_eq!(registry.calls(), 2);
    assert_eq!(registry.created.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn blank_required_field_never_reaches_the_shop() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let blank = SourceItem::from_value(ResourceType::Family, json!({ "code": " " })).unwrap();
    let err = importer
        .submit_single(ResourceType::Family, &blank)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Validation(_)));
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn untyped_attribute_never_reaches_the_shop() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let untyped =
        SourceItem::from_value(ResourceType::Attribute, json!({ "code": "color" })).unwrap();
    let err = importer
        .submit_single(ResourceType::Attribute, &untyped)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ImportError::Validation(ref m) if m == "Missing mandatory information: type"),
        "got {err:?}"
    );
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn unlabelled_category_never_reaches_the_shop() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let unlabelled = SourceItem::from_value(
        ResourceType::Category,
        json!({ "code": "summer", "labels": null }),
    )
    .unwrap();
    let job = ImportJob::new(ResourceType::Category, vec![unlabelled]).unwrap();
    let outcome = importer.submit_bulk(job).await;

    assert_eq!(outcome.failed_count, 1);
    assert_eq!(
        outcome.items[0].status,
        ItemStatus::Error {
            message: "Missing mandatory information: label".to_owned()
        }
    );
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn item_of_another_resource_is_rejected_before_io() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let err = importer
        .submit_single(ResourceType::Category, &attribute("color"))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn pages_report_previous_only_after_the_first() {
    let catalog = FakeCatalog::with_attribute_pages(&[&["a", "b"], &["c", "d"], &["e"]]);
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let mut seen_codes = Vec::new();
    for page in 1..=3 {
        let listing = importer
            .fetch_page(ResourceType::Attribute, page, None)
            .await
            .expect("page");
        assert_eq!(listing.has_previous, page > 1);
        assert_eq!(listing.has_next, page < 3);
        for item in &listing.items {
            assert!(!seen_codes.contains(&item.code().to_owned()));
            seen_codes.push(item.code().to_owned());
        }
    }
    assert_eq!(seen_codes.len(), 5);
}

#[tokio::test]
async fn product_category_filter_is_sent_as_search_json() {
    let mut catalog = FakeCatalog::default();
    catalog
        .pages
        .insert(1, vec![json!({ "identifier": "sku-1", "values": {} })]);
    catalog.last_page = 1;
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let page = importer
        .fetch_page(
            ResourceType::Product,
            1,
            Some(ListingFilter::Category("summer-sale".to_owned())),
        )
        .await
        .expect("filtered page");
    assert_eq!(page.items.len(), 1);

    let seen = catalog.seen.lock().unwrap();
    let (resource, _, locales, search) = &seen[0];
    assert_eq!(*resource, ResourceType::Product);
    assert_eq!(locales.as_deref(), Some("nl_NL"));
    assert_eq!(
        search.as_deref(),
        Some(r#"{"categories":[{"operator":"IN","value":["summer-sale"]}]}"#)
    );
}

#[tokio::test]
async fn page_zero_is_rejected_without_a_catalog_call() {
    let catalog = FakeCatalog::default();
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let err = importer
        .fetch_page(ResourceType::Attribute, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidRequest(_)));
    assert!(catalog.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn catalog_failure_is_upstream_unavailable() {
    let catalog = FakeCatalog {
        fail_with_status: Some(500),
        ..FakeCatalog::default()
    };
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let err = importer
        .fetch_page(ResourceType::Attribute, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::UpstreamUnavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn duplicate_codes_make_the_page_malformed() {
    let catalog = FakeCatalog::with_attribute_pages(&[&["a", "a"]]);
    let registry = FakeRegistry::default();
    let importer = importer(&catalog, &registry);

    let err = importer
        .fetch_page(ResourceType::Attribute, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::MalformedPage(_)), "got {err:?}");
}
