//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_TAX_RATE` - Sales-tax rate as a fraction (default: 0.0825)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `CATALOG_CACHE_CAPACITY` - Catalog cache max entries (default: 1000)

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::store::CacheSettings;
use crate::totals::TaxRate;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Regional sales-tax rate applied to the subtotal
    pub tax_rate: TaxRate,
    /// Catalog cache sizing
    pub cache: CacheSettings,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("STOREFRONT_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

        let tax_rate = parse_or_default(&lookup, "STOREFRONT_TAX_RATE", TaxRate::DEFAULT)?;
        let ttl_secs = parse_or_default(&lookup, "CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let max_capacity =
            parse_or_default(&lookup, "CATALOG_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;

        Ok(Self {
            database_url,
            tax_rate,
            cache: CacheSettings {
                max_capacity,
                time_to_live: Duration::from_secs(ttl_secs),
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/ls")]).unwrap();
        assert_eq!(config.tax_rate, TaxRate::DEFAULT);
        assert_eq!(config.cache.max_capacity, 1000);
        assert_eq!(config.cache.time_to_live, Duration::from_secs(300));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/ls")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/ls");

        let config = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://primary/ls"),
            ("DATABASE_URL", "postgres://fallback/ls"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://primary/ls");
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_DATABASE_URL"));
    }

    #[test]
    fn test_custom_values() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/ls"),
            ("STOREFRONT_TAX_RATE", "0.06"),
            ("CATALOG_CACHE_TTL_SECS", "30"),
            ("CATALOG_CACHE_CAPACITY", " 50 "),
        ])
        .unwrap();
        assert_eq!(config.tax_rate.to_string(), "6%");
        assert_eq!(config.cache.time_to_live, Duration::from_secs(30));
        assert_eq!(config.cache.max_capacity, 50);
    }

    #[test]
    fn test_invalid_tax_rate() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/ls"),
            ("STOREFRONT_TAX_RATE", "1.5"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_TAX_RATE"));
    }

    #[test]
    fn test_invalid_cache_ttl() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/ls"),
            ("CATALOG_CACHE_TTL_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
