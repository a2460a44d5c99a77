//! Database access for the catalog `PostgreSQL` store.
//!
//! The hosted store owns every catalog row; this crate only reads them.
//!
//! ## Tables
//!
//! - `categories` - Product categories (bilingual names, optional parent)
//! - `products` - Products with base, contractor and wholesale prices
//! - `delivery_groups` - Vehicle groups with a flat base fee
//! - `category_delivery_groups` - Category to delivery-group link (unique per category)
//! - `zip_code_restrictions` - Per-zip availability and fee overrides
//! - `profiles` - Account tier per user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p landscape-supply-cli -- migrate
//! ```

pub mod catalog;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store could not be reached (non-SQL backends, injected faults).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Whether the failure is likely to go away on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            Self::Unavailable(_) => true,
            Self::DataCorruption(_) => false,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the catalog schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
