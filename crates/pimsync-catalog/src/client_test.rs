use super::*;

fn credentials(url: &str) -> CatalogCredentials {
    CatalogCredentials {
        url: url.to_owned(),
        client_id: "client".to_owned(),
        client_secret: "secret".to_owned(),
        username: "admin".to_owned(),
        password: "password".to_owned(),
    }
}

fn client(url: &str) -> CatalogClient {
    CatalogClient::new(credentials(url), 5, "pimsync-test/0.1").expect("client should build")
}

fn query(resource: ResourceType) -> ListQuery<'static> {
    ListQuery {
        resource,
        page: 2,
        limit: 10,
        locales: None,
        search: None,
    }
}

#[test]
fn listing_url_uses_plural_endpoint_and_paging() {
    let url = client("https://pim.example.com")
        .listing_url(&query(ResourceType::Category))
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://pim.example.com/api/rest/v1/categories?page=2&limit=10"
    );
}

#[test]
fn listing_url_encodes_search_and_locales() {
    let search = r#"{"categories":[{"operator":"IN","value":["summer-sale"]}]}"#;
    let q = ListQuery {
        locales: Some("nl_NL"),
        search: Some(search),
        ..query(ResourceType::Product)
    };
    let url = client("https://pim.example.com/").listing_url(&q).unwrap();

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("locales".to_owned(), "nl_NL".to_owned())));
    assert!(pairs.contains(&("search".to_owned(), search.to_owned())));
    assert!(!url.as_str().contains('"'), "search must be percent-encoded");
}

#[test]
fn blank_locales_are_omitted() {
    let q = ListQuery {
        locales: Some(" "),
        ..query(ResourceType::Product)
    };
    let url = client("https://pim.example.com").listing_url(&q).unwrap();
    assert!(url.query_pairs().all(|(k, _)| k != "locales"));
}

#[test]
fn base_url_keeps_sub_path() {
    let url = client("https://example.com/pim/")
        .listing_url(&query(ResourceType::Family))
        .unwrap();
    assert!(url
        .as_str()
        .starts_with("https://example.com/pim/api/rest/v1/families?"));
}

#[test]
fn base_url_must_be_http() {
    let err = CatalogClient::new(credentials("ftp://pim.example.com"), 5, "ua")
        .err()
        .expect("ftp should be rejected");
    assert!(matches!(err, CatalogError::InvalidBaseUrl { .. }));
}

#[test]
fn base_url_must_parse() {
    let err = CatalogClient::new(credentials("not a url"), 5, "ua")
        .err()
        .expect("garbage should be rejected");
    assert!(matches!(err, CatalogError::InvalidBaseUrl { .. }));
}
