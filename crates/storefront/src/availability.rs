//! Per-zip product availability.
//!
//! A restriction row can only take a product away or attach a delivery-fee
//! override; a product with no row for the zip code is available.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};

use landscape_supply_core::{Price, Product, ProductId, ZipCode, ZipCodeRestriction};

use crate::error::{LookupStage, PricingError, Result};
use crate::store::CatalogStore;

/// Availability of one product at one zip code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub is_available: bool,
    pub delivery_fee_override: Option<Price>,
}

impl Availability {
    /// No restriction row: available, no override.
    pub const UNRESTRICTED: Self = Self {
        is_available: true,
        delivery_fee_override: None,
    };
}

/// Restriction rows for a batch of products at one zip code, indexed by product.
#[derive(Debug, Clone, Default)]
pub struct ZipAvailability {
    restrictions: HashMap<ProductId, Availability>,
}

impl ZipAvailability {
    /// Index restriction rows for `zip`. Rows for other zip codes are ignored;
    /// if a product somehow has several rows, "unavailable" wins and the
    /// largest override is kept.
    #[must_use]
    pub fn from_rows(zip: &ZipCode, rows: impl IntoIterator<Item = ZipCodeRestriction>) -> Self {
        let mut restrictions: HashMap<ProductId, Availability> = HashMap::new();

        for row in rows.into_iter().filter(|r| r.zip_code == zip.base()) {
            let entry = restrictions
                .entry(row.product_id)
                .or_insert(Availability::UNRESTRICTED);
            entry.is_available &= row.is_available;
            entry.delivery_fee_override = match (entry.delivery_fee_override, row.delivery_fee_override) {
                (Some(a), Some(b)) => Some(if b.amount > a.amount { b } else { a }),
                (a, b) => a.or(b),
            };
        }

        Self { restrictions }
    }

    /// Availability of one product.
    #[must_use]
    pub fn check(&self, product_id: ProductId) -> Availability {
        self.restrictions
            .get(&product_id)
            .copied()
            .unwrap_or(Availability::UNRESTRICTED)
    }

    #[must_use]
    pub fn is_available(&self, product_id: ProductId) -> bool {
        self.check(product_id).is_available
    }

    /// Delivery-fee overrides for products that are available at this zip.
    #[must_use]
    pub fn fee_overrides(&self) -> FeeOverrides {
        FeeOverrides(
            self.restrictions
                .iter()
                .filter(|(_, a)| a.is_available)
                .filter_map(|(id, a)| a.delivery_fee_override.map(|fee| (*id, fee)))
                .collect(),
        )
    }
}

/// Zip-level delivery-fee overrides keyed by product, consumed by the
/// delivery-fee aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeOverrides(HashMap<ProductId, Price>);

impl FeeOverrides {
    /// No overrides (no zip code given).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<Price> {
        self.0.get(&product_id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ProductId, Price)> for FeeOverrides {
    fn from_iter<I: IntoIterator<Item = (ProductId, Price)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Load restriction rows for a batch of products in one round trip.
///
/// An empty batch performs no lookup.
///
/// # Errors
///
/// Returns [`PricingError::Lookup`] if the store query fails.
#[instrument(skip(store, product_ids, zip), fields(count = product_ids.len(), zip = %zip))]
pub async fn load_zip_availability<S: CatalogStore>(
    store: &S,
    product_ids: &[ProductId],
    zip: &ZipCode,
) -> Result<ZipAvailability> {
    if product_ids.is_empty() {
        return Ok(ZipAvailability::default());
    }

    let ids = crate::store::unique_ids(product_ids.iter().copied());
    let rows = store
        .restrictions_for_zip(&ids, zip)
        .await
        .map_err(|e| PricingError::lookup(LookupStage::ZipRestrictions, e))?;
    debug!(rows = rows.len(), "loaded zip restrictions");

    Ok(ZipAvailability::from_rows(zip, rows))
}

/// Keep only the products purchasable at `zip`, preserving order.
/// Inactive products are dropped without a restriction lookup.
///
/// # Errors
///
/// Returns [`PricingError::Lookup`] if the restriction lookup fails.
pub async fn filter_available<S: CatalogStore>(
    store: &S,
    products: Vec<Product>,
    zip: &ZipCode,
) -> Result<Vec<Product>> {
    let before = products.len();
    let active: Vec<Product> = products.into_iter().filter(|p| p.is_active).collect();

    let ids: Vec<ProductId> = active.iter().map(|p| p.id).collect();
    let availability = load_zip_availability(store, &ids, zip).await?;

    let available: Vec<Product> = active
        .into_iter()
        .filter(|p| availability.is_available(p.id))
        .collect();
    debug!(excluded = before - available.len(), "filtered products for zip");

    Ok(available)
}

/// Availability of a single product at `zip`.
///
/// # Errors
///
/// Returns [`PricingError::Lookup`] if the restriction lookup fails.
pub async fn check_availability<S: CatalogStore>(
    store: &S,
    product_id: ProductId,
    zip: &ZipCode,
) -> Result<Availability> {
    let availability = load_zip_availability(store, &[product_id], zip).await?;
    Ok(availability.check(product_id))
}
