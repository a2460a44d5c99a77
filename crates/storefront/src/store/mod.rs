//! The catalog store seam.
//!
//! Every method is a single batched round trip. Implementations return rows
//! in any order; callers index them by ID. Missing IDs are simply absent from
//! the result, never an error.

mod cached;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use landscape_supply_core::{
    AccountTier, Category, CategoryDeliveryGroup, CategoryId, DeliveryGroup, Product, ProductId,
    UserId, ZipCode, ZipCodeRestriction,
};

use crate::db::RepositoryError;

pub use cached::{CacheSettings, CachedCatalogStore};

/// Sorted, de-duplicated copy of an ID batch, so each ID is asked for once.
#[must_use]
pub fn unique_ids<T: Ord + Copy>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut ids: Vec<T> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Products indexed by ID.
pub type ProductIndex = HashMap<ProductId, Product>;

/// Fetch a batch of products in one round trip and index them by ID.
///
/// # Errors
///
/// Returns the store's error unchanged.
pub async fn fetch_product_index<S: CatalogStore>(
    store: &S,
    ids: impl IntoIterator<Item = ProductId>,
) -> Result<ProductIndex, RepositoryError> {
    let ids = unique_ids(ids);
    if ids.is_empty() {
        return Ok(ProductIndex::new());
    }
    let products = store.products_by_ids(&ids).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Read access to catalog data owned by the external store.
pub trait CatalogStore: Send + Sync {
    /// Products by ID, active or not.
    fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Categories by ID.
    fn categories_by_ids(
        &self,
        ids: &[CategoryId],
    ) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    /// Category to delivery-group links for the given categories, joined with
    /// the group rows.
    fn delivery_links_for_categories(
        &self,
        ids: &[CategoryId],
    ) -> impl Future<Output = Result<Vec<CategoryDeliveryGroup>, RepositoryError>> + Send;

    /// Zip restriction rows for the given products at one zip code.
    fn restrictions_for_zip(
        &self,
        product_ids: &[ProductId],
        zip: &ZipCode,
    ) -> impl Future<Output = Result<Vec<ZipCodeRestriction>, RepositoryError>> + Send;

    /// The account tier on a user's profile, if they have one.
    fn account_tier(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<AccountTier>, RepositoryError>> + Send;

    /// All active delivery groups.
    fn active_delivery_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<DeliveryGroup>, RepositoryError>> + Send;
}

impl<S: CatalogStore> CatalogStore for Arc<S> {
    fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send {
        (**self).products_by_ids(ids)
    }

    fn categories_by_ids(
        &self,
        ids: &[CategoryId],
    ) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send {
        (**self).categories_by_ids(ids)
    }

    fn delivery_links_for_categories(
        &self,
        ids: &[CategoryId],
    ) -> impl Future<Output = Result<Vec<CategoryDeliveryGroup>, RepositoryError>> + Send {
        (**self).delivery_links_for_categories(ids)
    }

    fn restrictions_for_zip(
        &self,
        product_ids: &[ProductId],
        zip: &ZipCode,
    ) -> impl Future<Output = Result<Vec<ZipCodeRestriction>, RepositoryError>> + Send {
        (**self).restrictions_for_zip(product_ids, zip)
    }

    fn account_tier(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<AccountTier>, RepositoryError>> + Send {
        (**self).account_tier(user_id)
    }

    fn active_delivery_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<DeliveryGroup>, RepositoryError>> + Send {
        (**self).active_delivery_groups()
    }
}
