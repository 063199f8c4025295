//! OAuth password-grant token exchange.

use serde::Serialize;

use crate::error::CatalogError;
use crate::types::TokenResponse;

use super::CatalogClient;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    username: &'a str,
    password: &'a str,
}

impl CatalogClient {
    /// Returns the cached access token, requesting one on first use.
    pub(super) async fn access_token(&self) -> Result<&str, CatalogError> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .map(String::as_str)
    }

    /// `POST /api/oauth/v1/token` with the client id/secret as HTTP Basic
    /// credentials and the user's login in the JSON body.
    async fn request_token(&self) -> Result<String, CatalogError> {
        let url = self.endpoint("api/oauth/v1/token")?;
        let response = self
            .client
            .post(url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .json(&TokenRequest {
                grant_type: "password",
                username: &self.credentials.username,
                password: &self.credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            tracing::warn!(
                status = status.as_u16(),
                catalog = %self.base_url,
                "catalog token request refused"
            );
            return Err(CatalogError::AuthFailed {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: format!("{}api/oauth/v1/token", self.base_url),
            });
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: "token response".to_owned(),
                source: e,
            })?;

        tracing::debug!(
            expires_in = token.expires_in,
            catalog = %self.base_url,
            "obtained catalog access token"
        );
        Ok(token.access_token)
    }
}
