//! Admin GraphQL client for one shop.

use std::time::Duration;

use pimsync_core::TargetCredentials;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ShopifyError;
use crate::types::{CreateRequest, CreateResult, GraphQlResponse, MutationPayload};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Sends creation mutations to a shop's Admin GraphQL endpoint.
pub struct AdminClient {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl AdminClient {
    /// Builds a client for `https://{shop}/admin/api/{api_version}/graphql.json`.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::InvalidShopDomain`] if the shop domain is blank or
    ///   carries a path.
    /// - [`ShopifyError::Http`] if the underlying client cannot be built.
    pub fn for_shop(
        credentials: &TargetCredentials,
        api_version: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ShopifyError> {
        let domain = normalize_shop_domain(&credentials.shop_domain)?;
        let raw = format!("https://{domain}/admin/api/{api_version}/graphql.json");
        let endpoint = Url::parse(&raw).map_err(|e| ShopifyError::InvalidShopDomain {
            domain: credentials.shop_domain.clone(),
            reason: e.to_string(),
        })?;
        Self::with_endpoint(endpoint, &credentials.access_token, timeout_secs, user_agent)
    }

    /// Builds a client against an explicit GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying client cannot be built.
    pub fn with_endpoint(
        endpoint: Url,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_owned(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Runs the creation mutation for `request`.
    ///
    /// User errors in the payload are returned inside an `Ok` result; only
    /// transport, status and protocol failures are `Err`.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::Unauthorized`] on HTTP 401/403.
    /// - [`ShopifyError::RateLimited`] on HTTP 429.
    /// - [`ShopifyError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ShopifyError::GraphQl`] when the response only carries top-level errors.
    /// - [`ShopifyError::MissingPayload`] when the mutation field is absent.
    /// - [`ShopifyError::Deserialize`] if the body is not a GraphQL response.
    pub async fn create(&self, request: &CreateRequest) -> Result<CreateResult, ShopifyError> {
        let mutation = request.mutation();
        let body = json!({
            "query": mutation.document,
            "variables": request.variables(),
        });

        tracing::debug!(operation = mutation.root_field, "sending admin mutation");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ShopifyError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(2);
            return Err(ShopifyError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let text = response.text().await?;
        let parsed: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| ShopifyError::Deserialize {
                context: mutation.root_field.to_owned(),
                source: e,
            })?;

        let payload = parsed
            .data
            .as_ref()
            .and_then(|d| d.get(mutation.root_field))
            .filter(|p| !p.is_null());

        let Some(payload) = payload else {
            if !parsed.errors.is_empty() {
                return Err(ShopifyError::GraphQl(
                    parsed.errors.into_iter().map(|e| e.message).collect(),
                ));
            }
            return Err(ShopifyError::MissingPayload {
                operation: mutation.root_field,
            });
        };

        let result = parse_payload(payload, mutation.result_field).map_err(|e| {
            ShopifyError::Deserialize {
                context: mutation.root_field.to_owned(),
                source: e,
            }
        })?;

        if let Some(first) = result.user_errors.first() {
            tracing::debug!(
                operation = mutation.root_field,
                count = result.user_errors.len(),
                first = %first.message,
                "mutation returned user errors"
            );
        }
        Ok(result)
    }
}

fn parse_payload(payload: &Value, result_field: &str) -> Result<CreateResult, serde_json::Error> {
    let MutationPayload { user_errors } = MutationPayload::deserialize(payload)?;
    let created_id = payload
        .get(result_field)
        .and_then(|r| r.get("id"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    Ok(CreateResult {
        created_id,
        user_errors,
    })
}

/// Accepts `shop.myshopify.com`, optionally with a scheme or trailing slash.
fn normalize_shop_domain(raw: &str) -> Result<String, ShopifyError> {
    let trimmed = raw.trim();
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/');

    let invalid = |reason: &str| ShopifyError::InvalidShopDomain {
        domain: raw.to_owned(),
        reason: reason.to_owned(),
    };

    if host.is_empty() {
        return Err(invalid("domain is empty"));
    }
    if host.contains('/') {
        return Err(invalid("domain must not contain a path"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(invalid("domain must not contain whitespace"));
    }
    Ok(host.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(domain: &str) -> TargetCredentials {
        TargetCredentials {
            shop_domain: domain.to_owned(),
            access_token: "shpat_test".to_owned(),
        }
    }

    #[test]
    fn endpoint_includes_api_version() {
        let client = AdminClient::for_shop(&credentials("demo.myshopify.com"), "2025-01", 5, "ua")
            .expect("client should build");
        assert_eq!(
            client.endpoint().as_str(),
            "https://demo.myshopify.com/admin/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn scheme_and_trailing_slash_are_stripped() {
        assert_eq!(
            normalize_shop_domain("https://Demo.myshopify.com/").unwrap(),
            "demo.myshopify.com"
        );
    }

    #[test]
    fn blank_or_pathed_domains_are_rejected() {
        assert!(matches!(
            normalize_shop_domain("  "),
            Err(ShopifyError::InvalidShopDomain { .. })
        ));
        assert!(matches!(
            normalize_shop_domain("demo.myshopify.com/admin"),
            Err(ShopifyError::InvalidShopDomain { .. })
        ));
    }

    #[test]
    fn payload_reads_id_and_user_errors() {
        let payload = json!({
            "collection": null,
            "userErrors": [{ "field": ["handle"], "message": "Handle has already been taken" }]
        });
        let result = parse_payload(&payload, "collection").unwrap();
        assert_eq!(result.created_id, None);
        assert_eq!(result.first_error(), Some("Handle has already been taken"));

        let payload = json!({
            "product": { "id": "gid://shopify/Product/1" },
            "userErrors": []
        });
        let result = parse_payload(&payload, "product").unwrap();
        assert_eq!(result.created_id.as_deref(), Some("gid://shopify/Product/1"));
        assert!(result.is_success());
    }
}
