use std::ops::RangeInclusive;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup and no `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32_in = |var: &str,
                        default: &str,
                        range: RangeInclusive<u32>|
     -> Result<u32, ConfigError> {
        let value = or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !range.contains(&value) {
            return Err(invalid(
                var,
                format!(
                    "{value} is outside {}..={}",
                    range.start(),
                    range.end()
                ),
            ));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PIMSYNC_ENV", "development"))?;
    let bind_addr = parse_addr("PIMSYNC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PIMSYNC_LOG_LEVEL", "info");

    let db_max_connections = parse_u32_in("PIMSYNC_DB_MAX_CONNECTIONS", "10", 1..=u32::MAX)?;
    let db_min_connections = parse_u32_in("PIMSYNC_DB_MIN_CONNECTIONS", "1", 0..=u32::MAX)?;
    let db_acquire_timeout_secs = parse_u64("PIMSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("PIMSYNC_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("PIMSYNC_USER_AGENT", "pimsync/0.1 (catalog-import)");

    let page_size = parse_u32_in("PIMSYNC_PAGE_SIZE", "10", 1..=100)?;
    let label_locale = or_default("PIMSYNC_LABEL_LOCALE", "en_US");
    let product_locales = or_default("PIMSYNC_PRODUCT_LOCALES", "nl_NL");
    let metafield_namespace = or_default("PIMSYNC_METAFIELD_NAMESPACE", "akeneo");
    let shopify_api_version = or_default("SHOPIFY_API_VERSION", "2025-01");
    let sync_interval_hours = parse_u32_in("PIMSYNC_SYNC_INTERVAL_HOURS", "2", 1..=23)?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        page_size,
        label_locale,
        product_locales,
        metafield_namespace,
        shopify_api_version,
        sync_interval_hours,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PIMSYNC_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
