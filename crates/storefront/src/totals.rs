//! Order total composition.
//!
//! `total = subtotal + delivery_fee + subtotal × tax_rate`. Delivery is not
//! taxed. Amounts stay exact; rounding is a display concern.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use landscape_supply_core::{AccountTier, CartLine, Price, ProductId, ZipCode};

use crate::availability::{ZipAvailability, load_zip_availability};
use crate::delivery::{DeliveryGroupLine, aggregate_for_products};
use crate::error::{LookupStage, PricingError, Result};
use crate::pricing;
use crate::store::{CatalogStore, fetch_product_index, unique_ids};

/// Errors from building a [`TaxRate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxRateError {
    #[error("tax rate must be a decimal number: {0}")]
    Parse(String),
    #[error("tax rate must be at least 0 and below 1 (got {0})")]
    OutOfRange(Decimal),
}

/// A regional sales-tax rate as a fraction (`0.0825` is 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Clark County, Nevada combined sales-tax rate.
    pub const DEFAULT: Self = Self(Decimal::from_parts(825, 0, 0, false, 4));

    /// Create a tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::OutOfRange`] unless `0 <= rate < 1`.
    pub fn new(rate: Decimal) -> std::result::Result<Self, TaxRateError> {
        if (rate.is_sign_negative() && !rate.is_zero()) || rate >= Decimal::ONE {
            return Err(TaxRateError::OutOfRange(rate));
        }
        Ok(Self(rate))
    }

    /// The rate as a fraction.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The rate as a percentage, e.g. `8.25`.
    #[must_use]
    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for TaxRate {
    type Err = TaxRateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rate = Decimal::from_str(s.trim()).map_err(|e| TaxRateError::Parse(e.to_string()))?;
        Self::new(rate)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Subtotal, delivery, tax and grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Combine a subtotal and delivery fee under a tax rate.
    #[must_use]
    pub fn compose(subtotal: Price, delivery_fee: Price, tax_rate: TaxRate) -> Self {
        let tax = subtotal.apply_rate(tax_rate.as_decimal());
        Self {
            subtotal,
            delivery_fee,
            tax,
            total: subtotal + delivery_fee + tax,
        }
    }

    /// All zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::compose(Price::zero(), Price::zero(), TaxRate::DEFAULT)
    }
}

/// Everything the order summary shows for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub tax: Price,
    pub total: Price,
    pub tax_rate: TaxRate,
    pub account_tier: AccountTier,
    /// Delivery groups in order of first appearance in the cart.
    pub delivery_groups: Vec<DeliveryGroupLine>,
    /// Cart products that are no longer active or cannot be delivered to the
    /// requested zip code. Their lines are still priced.
    pub unavailable_products: Vec<ProductId>,
}

impl CartTotals {
    fn empty(account_tier: AccountTier, tax_rate: TaxRate) -> Self {
        let totals = OrderTotals::zero();
        Self {
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            tax: totals.tax,
            total: totals.total,
            tax_rate,
            account_tier,
            delivery_groups: Vec::new(),
            unavailable_products: Vec::new(),
        }
    }

    /// The four summary amounts.
    #[must_use]
    pub const fn order_totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            tax: self.tax,
            total: self.total,
        }
    }

    /// Whether every product is active and deliverable to the requested zip code.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        self.unavailable_products.is_empty()
    }
}

/// Price a cart for checkout.
///
/// Products and (when a zip code is given) zip restrictions are fetched
/// concurrently, then categories and delivery links. An empty cart performs
/// no lookups.
///
/// # Errors
///
/// Any failed lookup aborts the whole computation:
/// [`PricingError::Lookup`] for products or restrictions,
/// [`PricingError::DeliveryFeeUnavailable`] for categories or groups, and
/// [`PricingError::MissingProduct`] if a line's product does not exist.
#[instrument(
    skip(store, lines, tier, zip),
    fields(lines = lines.len(), tier = %tier, zip = zip.map(ZipCode::as_str))
)]
pub async fn compute_cart_totals<S: CatalogStore>(
    store: &S,
    lines: &[CartLine],
    tier: AccountTier,
    zip: Option<&ZipCode>,
    tax_rate: TaxRate,
) -> Result<CartTotals> {
    if lines.is_empty() {
        return Ok(CartTotals::empty(tier, tax_rate));
    }

    let product_ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    let (products, availability) = tokio::try_join!(
        async {
            fetch_product_index(store, product_ids.iter().copied())
                .await
                .map_err(|e| PricingError::lookup(LookupStage::Products, e))
        },
        async {
            match zip {
                Some(zip) => load_zip_availability(store, &product_ids, zip).await,
                None => Ok(ZipAvailability::default()),
            }
        },
    )?;

    let priced = lines
        .iter()
        .map(|line| {
            products
                .get(&line.product_id)
                .map(|product| (product, line.quantity))
                .ok_or(PricingError::MissingProduct(line.product_id))
        })
        .collect::<Result<Vec<_>>>()?;
    let subtotal = pricing::subtotal(priced, tier);

    let quote =
        aggregate_for_products(store, lines, &products, &availability.fee_overrides()).await?;

    let unavailable_products: Vec<ProductId> = unique_ids(product_ids)
        .into_iter()
        .filter(|id| {
            let retired = products.get(id).is_some_and(|p| !p.is_active);
            retired || !availability.is_available(*id)
        })
        .collect();
    if !unavailable_products.is_empty() {
        info!(
            count = unavailable_products.len(),
            "cart contains products that cannot be purchased"
        );
    }

    let totals = OrderTotals::compose(subtotal, quote.total_fee, tax_rate);
    Ok(CartTotals {
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        tax: totals.tax,
        total: totals.total,
        tax_rate,
        account_tier: tier,
        delivery_groups: quote.groups,
        unavailable_products,
    })
}

/// Subtotal, delivery fee, tax and total for a cart, without zip overrides.
///
/// # Errors
///
/// See [`compute_cart_totals`].
pub async fn compose_total<S: CatalogStore>(
    store: &S,
    lines: &[CartLine],
    tier: AccountTier,
    tax_rate: TaxRate,
) -> Result<OrderTotals> {
    compute_cart_totals(store, lines, tier, None, tax_rate)
        .await
        .map(|totals| totals.order_totals())
}
