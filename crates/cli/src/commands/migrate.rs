//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ls-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Catalog migrations live in `crates/storefront/migrations/`.

use landscape_supply_storefront::config::StorefrontConfig;
use landscape_supply_storefront::db;

use super::CommandError;

/// Run catalog database migrations.
pub async fn run() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running catalog migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
