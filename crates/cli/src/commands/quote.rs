//! Pricing commands: cart quotes, availability and delivery groups.
//!
//! All commands print JSON to stdout.

use landscape_supply_core::{AccountTier, CartLine, Price, ProductId, UserId, ZipCode};
use landscape_supply_storefront::availability::load_zip_availability;
use landscape_supply_storefront::config::StorefrontConfig;
use landscape_supply_storefront::db::PgCatalogStore;
use landscape_supply_storefront::{CachedCatalogStore, Storefront};
use serde::Serialize;
use thiserror::Error;

use super::{CommandError, print_json};

/// Errors parsing a `<product_id>:<quantity>` argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineParseError {
    #[error("expected <product_id>:<quantity>, got '{0}'")]
    Format(String),
    #[error("invalid product id '{0}'")]
    ProductId(String),
    #[error("invalid quantity '{0}'")]
    Quantity(String),
}

/// Parse a cart line argument such as `0b0f...f11:3`.
pub fn parse_line(arg: &str) -> Result<CartLine, LineParseError> {
    let (id, qty) = arg
        .rsplit_once(':')
        .ok_or_else(|| LineParseError::Format(arg.to_owned()))?;
    let product_id: ProductId = id
        .parse()
        .map_err(|_| LineParseError::ProductId(id.to_owned()))?;
    let quantity: i64 = qty
        .trim()
        .parse()
        .map_err(|_| LineParseError::Quantity(qty.to_owned()))?;
    CartLine::try_new(product_id, quantity).map_err(|e| LineParseError::Quantity(e.to_string()))
}

async fn connect() -> Result<Storefront<CachedCatalogStore<PgCatalogStore>>, CommandError> {
    let config = StorefrontConfig::from_env()?;
    Ok(Storefront::connect(&config).await?)
}

/// Print checkout totals for a cart.
pub async fn quote(
    lines: &[CartLine],
    tier: Option<AccountTier>,
    user: Option<UserId>,
    zip: Option<&ZipCode>,
) -> Result<(), CommandError> {
    let storefront = connect().await?;

    let tier = match tier {
        Some(tier) => tier,
        None => storefront.account_tier(user).await?,
    };
    tracing::info!(%tier, lines = lines.len(), "Computing cart totals");

    let totals = storefront.compute_cart_totals(lines, tier, zip).await?;
    if !totals.is_deliverable() {
        tracing::warn!(
            products = ?totals.unavailable_products,
            "Some products cannot be purchased for this order"
        );
    }
    print_json(&totals)
}

#[derive(Debug, Serialize)]
struct AvailabilityRow {
    product_id: ProductId,
    is_available: bool,
    delivery_fee_override: Option<Price>,
}

/// Print availability of each product at `zip`.
pub async fn availability(products: &[ProductId], zip: &ZipCode) -> Result<(), CommandError> {
    let storefront = connect().await?;

    let availability = load_zip_availability(storefront.store(), products, zip).await?;
    let rows: Vec<AvailabilityRow> = products
        .iter()
        .map(|&product_id| {
            let check = availability.check(product_id);
            AvailabilityRow {
                product_id,
                is_available: check.is_available,
                delivery_fee_override: check.delivery_fee_override,
            }
        })
        .collect();
    print_json(&rows)
}

/// Print active delivery groups.
pub async fn delivery_groups() -> Result<(), CommandError> {
    let storefront = connect().await?;
    let groups = storefront.delivery_groups().await?;
    print_json(&groups)
}
