//! Storefront handle shared across callers.

use std::sync::Arc;

use landscape_supply_core::{
    AccountTier, CartLine, DeliveryGroup, Product, ProductId, UserId, ZipCode,
};

use crate::availability::{self, Availability, FeeOverrides};
use crate::config::StorefrontConfig;
use crate::db::{self, PgCatalogStore};
use crate::delivery::{self, DeliveryQuote};
use crate::error::Result;
use crate::pricing;
use crate::store::{CachedCatalogStore, CatalogStore};
use crate::totals::{self, CartTotals, OrderTotals, TaxRate};

/// The pricing engine bound to a catalog store and a tax rate.
///
/// This struct is cheaply cloneable via `Arc`. Every operation reads the
/// catalog fresh through the store (or its cache) and holds no per-cart
/// state, so concurrent calls never interfere.
pub struct Storefront<S> {
    inner: Arc<StorefrontInner<S>>,
}

struct StorefrontInner<S> {
    store: S,
    tax_rate: TaxRate,
}

impl<S> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Errors connecting a storefront to its database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
}

impl Storefront<CachedCatalogStore<PgCatalogStore>> {
    /// Connect to `PostgreSQL` and put a catalog cache in front of it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Database`] if the pool cannot be created.
    pub async fn connect(config: &StorefrontConfig) -> std::result::Result<Self, ConnectError> {
        let pool = db::create_pool(&config.database_url).await?;
        let store = CachedCatalogStore::new(PgCatalogStore::new(pool), config.cache);
        Ok(Self::new(store, config.tax_rate))
    }
}

impl<S: CatalogStore> Storefront<S> {
    /// Create a storefront over any catalog store.
    #[must_use]
    pub fn new(store: S, tax_rate: TaxRate) -> Self {
        Self {
            inner: Arc::new(StorefrontInner { store, tax_rate }),
        }
    }

    /// The underlying catalog store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    #[must_use]
    pub fn tax_rate(&self) -> TaxRate {
        self.inner.tax_rate
    }

    /// Full checkout totals for a cart, with zip-level overrides when `zip`
    /// is given.
    ///
    /// # Errors
    ///
    /// See [`totals::compute_cart_totals`].
    pub async fn compute_cart_totals(
        &self,
        lines: &[CartLine],
        tier: AccountTier,
        zip: Option<&ZipCode>,
    ) -> Result<CartTotals> {
        totals::compute_cart_totals(self.store(), lines, tier, zip, self.tax_rate()).await
    }

    /// Subtotal, delivery fee, tax and total for a cart.
    ///
    /// # Errors
    ///
    /// See [`totals::compose_total`].
    pub async fn compose_total(&self, lines: &[CartLine], tier: AccountTier) -> Result<OrderTotals> {
        totals::compose_total(self.store(), lines, tier, self.tax_rate()).await
    }

    /// Delivery fee breakdown for a cart.
    ///
    /// # Errors
    ///
    /// See [`delivery::aggregate`].
    pub async fn aggregate_delivery(
        &self,
        lines: &[CartLine],
        overrides: &FeeOverrides,
    ) -> Result<DeliveryQuote> {
        delivery::aggregate(self.store(), lines, overrides).await
    }

    /// Keep only the products purchasable at `zip`.
    ///
    /// # Errors
    ///
    /// See [`availability::filter_available`].
    pub async fn filter_products_for_zip(
        &self,
        products: Vec<Product>,
        zip: &ZipCode,
    ) -> Result<Vec<Product>> {
        availability::filter_available(self.store(), products, zip).await
    }

    /// Availability of one product at `zip`.
    ///
    /// # Errors
    ///
    /// See [`availability::check_availability`].
    pub async fn check_availability(
        &self,
        product_id: ProductId,
        zip: &ZipCode,
    ) -> Result<Availability> {
        availability::check_availability(self.store(), product_id, zip).await
    }

    /// Account tier for the current customer.
    ///
    /// # Errors
    ///
    /// See [`pricing::resolve_account_tier`].
    pub async fn account_tier(&self, user_id: Option<UserId>) -> Result<AccountTier> {
        pricing::resolve_account_tier(self.store(), user_id).await
    }

    /// The delivery group a product ships on.
    ///
    /// # Errors
    ///
    /// See [`delivery::delivery_group_for_product`].
    pub async fn delivery_group_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<DeliveryGroup>> {
        delivery::delivery_group_for_product(self.store(), product_id).await
    }

    /// All active delivery groups, cheapest first.
    ///
    /// # Errors
    ///
    /// See [`delivery::active_delivery_groups`].
    pub async fn delivery_groups(&self) -> Result<Vec<DeliveryGroup>> {
        delivery::active_delivery_groups(self.store()).await
    }
}
