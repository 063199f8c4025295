//! Per-shop credentials for the source catalog and the target store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog connection settings as persisted; any field may be unset.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCatalogSettings {
    pub url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl StoredCatalogSettings {
    /// Names of the fields that are unset or blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("url", &self.url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    /// Returns complete credentials, or the first missing field name.
    ///
    /// # Errors
    ///
    /// Returns the name of the first unset or blank field.
    pub fn validate(&self) -> Result<CatalogCredentials, &'static str> {
        if let Some(first) = self.missing_fields().into_iter().next() {
            return Err(first);
        }
        let take = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_owned();
        Ok(CatalogCredentials {
            url: take(&self.url),
            client_id: take(&self.client_id),
            client_secret: take(&self.client_secret),
            username: take(&self.username),
            password: take(&self.password),
        })
    }
}

impl fmt::Debug for StoredCatalogSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCatalogSettings")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Complete catalog credentials. Only obtainable through
/// [`StoredCatalogSettings::validate`] or direct construction.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogCredentials {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Admin API access for one shop.
#[derive(Clone, PartialEq, Eq)]
pub struct TargetCredentials {
    pub shop_domain: String,
    pub access_token: String,
}

impl fmt::Debug for TargetCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetCredentials")
            .field("shop_domain", &self.shop_domain)
            .field("access_token", &"[redacted]")
            .finish()
    }
}
