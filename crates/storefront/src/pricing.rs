//! Account-tier price resolution.
//!
//! Exactly one price applies per (product, tier): the tier column when it
//! holds a positive amount, otherwise the base price.

use landscape_supply_core::{AccountTier, Price, Product, Quantity, UserId};
use tracing::instrument;

use crate::error::{LookupStage, PricingError, Result};
use crate::store::CatalogStore;

/// Unit price of `product` for a customer of `tier`.
#[must_use]
pub fn resolve_price(product: &Product, tier: AccountTier) -> Price {
    let tier_price = match tier {
        AccountTier::Retail => None,
        AccountTier::Contractor => product.contractor_price,
        AccountTier::Wholesale => product.wholesale_price,
    };

    // An empty or zero tier column falls back to the base price.
    tier_price
        .filter(Price::is_positive)
        .unwrap_or(product.price)
}

/// Price of one cart line.
#[must_use]
pub fn line_total(product: &Product, tier: AccountTier, quantity: Quantity) -> Price {
    resolve_price(product, tier).times(quantity)
}

/// Sum of line totals.
pub fn subtotal<'a, I>(lines: I, tier: AccountTier) -> Price
where
    I: IntoIterator<Item = (&'a Product, Quantity)>,
{
    lines
        .into_iter()
        .map(|(product, quantity)| line_total(product, tier, quantity))
        .sum()
}

/// Account tier for the current customer. Anonymous customers and
/// customers without a profile are retail.
///
/// # Errors
///
/// Returns [`PricingError::Lookup`] if the profile lookup fails.
#[instrument(skip(store))]
pub async fn resolve_account_tier<S: CatalogStore>(
    store: &S,
    user_id: Option<UserId>,
) -> Result<AccountTier> {
    let Some(user_id) = user_id else {
        return Ok(AccountTier::Retail);
    };

    let tier = store
        .account_tier(user_id)
        .await
        .map_err(|e| PricingError::lookup(LookupStage::AccountTier, e))?;
    Ok(tier.unwrap_or_default())
}
