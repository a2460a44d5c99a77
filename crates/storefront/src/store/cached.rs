//! Caching decorator over any [`CatalogStore`].
//!
//! Entries are cached per ID (including negative answers such as "this
//! category has no delivery group") so a batch lookup only sends the misses
//! to the inner store, still in one round trip. Account tiers are never
//! cached. Writers to the catalog must call the `invalidate_*` methods.
//! Duplicate IDs in a batch are looked up once.

use std::collections::HashMap;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use landscape_supply_core::{
    AccountTier, Category, CategoryDeliveryGroup, CategoryId, DeliveryGroup, DeliveryGroupId,
    Product, ProductId, UserId, ZipCode, ZipCodeRestriction,
};

use super::{CatalogStore, unique_ids};
use crate::db::RepositoryError;

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Category(CategoryId),
    Links(CategoryId),
    Restriction { product: ProductId, zip: String },
    ActiveGroups,
}

/// Cached value types. `None` records a confirmed absence.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Option<Box<Product>>),
    Category(Option<Box<Category>>),
    Links(Vec<CategoryDeliveryGroup>),
    Restrictions(Vec<ZipCodeRestriction>),
    ActiveGroups(Vec<DeliveryGroup>),
}

/// Capacity and lifetime of cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub max_capacity: u64,
    pub time_to_live: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            time_to_live: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// A [`CatalogStore`] that remembers answers from the inner store.
#[derive(Clone)]
pub struct CachedCatalogStore<S> {
    inner: S,
    cache: Cache<CacheKey, CacheValue>,
}

impl<S: CatalogStore> CachedCatalogStore<S> {
    /// Wrap a store with a cache.
    #[must_use]
    pub fn new(inner: S, settings: CacheSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_capacity)
            .time_to_live(settings.time_to_live)
            .build();

        Self { inner, cache }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Drop the cached product row (after a price or category change).
    pub async fn invalidate_product(&self, id: ProductId) {
        self.cache.invalidate(&CacheKey::Product(id)).await;
    }

    /// Drop the cached category row and its delivery-group links.
    pub async fn invalidate_category(&self, id: CategoryId) {
        self.cache.invalidate(&CacheKey::Category(id)).await;
        self.cache.invalidate(&CacheKey::Links(id)).await;
        self.cache.invalidate(&CacheKey::ActiveGroups).await;
    }

    /// Drop every cached link that embeds this group (after a fee or
    /// active-flag change).
    pub async fn invalidate_delivery_group(&self, id: DeliveryGroupId) {
        let stale: Vec<CacheKey> = self
            .cache
            .iter()
            .filter(|(_, value)| match value {
                CacheValue::Links(links) => links.iter().any(|l| l.delivery_group.id == id),
                _ => false,
            })
            .map(|(key, _)| (*key).clone())
            .collect();

        debug!(group_id = %id, entries = stale.len(), "invalidating delivery group");
        for key in stale {
            self.cache.invalidate(&key).await;
        }
        self.cache.invalidate(&CacheKey::ActiveGroups).await;
    }

    /// Drop one product's cached restrictions at one zip code.
    pub async fn invalidate_restriction(&self, product: ProductId, zip: &ZipCode) {
        self.cache
            .invalidate(&CacheKey::Restriction {
                product,
                zip: zip.base().to_owned(),
            })
            .await;
    }
}

impl<S: CatalogStore> CatalogStore for CachedCatalogStore<S> {
    #[instrument(skip_all, fields(count = ids.len()))]
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids = unique_ids(ids.iter().copied());
        let mut found = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();

        for id in ids.iter().copied() {
            match self.cache.get(&CacheKey::Product(id)).await {
                Some(CacheValue::Product(Some(product))) => found.push(*product),
                Some(CacheValue::Product(None)) => {}
                _ => misses.push(id),
            }
        }

        debug!(hits = ids.len() - misses.len(), misses = misses.len(), "product cache");
        if misses.is_empty() {
            return Ok(found);
        }

        let mut fetched: HashMap<ProductId, Product> = self
            .inner
            .products_by_ids(&misses)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        for id in misses {
            let product = fetched.remove(&id);
            self.cache
                .insert(
                    CacheKey::Product(id),
                    CacheValue::Product(product.clone().map(Box::new)),
                )
                .await;
            found.extend(product);
        }

        Ok(found)
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError> {
        let ids = unique_ids(ids.iter().copied());
        let mut found = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();

        for id in ids {
            match self.cache.get(&CacheKey::Category(id)).await {
                Some(CacheValue::Category(Some(category))) => found.push(*category),
                Some(CacheValue::Category(None)) => {}
                _ => misses.push(id),
            }
        }

        if misses.is_empty() {
            return Ok(found);
        }

        let mut fetched: HashMap<CategoryId, Category> = self
            .inner
            .categories_by_ids(&misses)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        for id in misses {
            let category = fetched.remove(&id);
            self.cache
                .insert(
                    CacheKey::Category(id),
                    CacheValue::Category(category.clone().map(Box::new)),
                )
                .await;
            found.extend(category);
        }

        Ok(found)
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn delivery_links_for_categories(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<CategoryDeliveryGroup>, RepositoryError> {
        let mut found = Vec::new();
        let mut misses = Vec::new();

        for id in unique_ids(ids.iter().copied()) {
            match self.cache.get(&CacheKey::Links(id)).await {
                Some(CacheValue::Links(links)) => found.extend(links),
                _ => misses.push(id),
            }
        }

        if misses.is_empty() {
            return Ok(found);
        }

        let mut fetched: HashMap<CategoryId, Vec<CategoryDeliveryGroup>> = HashMap::new();
        for link in self.inner.delivery_links_for_categories(&misses).await? {
            fetched.entry(link.category_id).or_default().push(link);
        }

        for id in misses {
            let links = fetched.remove(&id).unwrap_or_default();
            self.cache
                .insert(CacheKey::Links(id), CacheValue::Links(links.clone()))
                .await;
            found.extend(links);
        }

        Ok(found)
    }

    #[instrument(skip_all, fields(count = product_ids.len(), zip = %zip))]
    async fn restrictions_for_zip(
        &self,
        product_ids: &[ProductId],
        zip: &ZipCode,
    ) -> Result<Vec<ZipCodeRestriction>, RepositoryError> {
        let key = |product: ProductId| CacheKey::Restriction {
            product,
            zip: zip.base().to_owned(),
        };

        let mut found = Vec::new();
        let mut misses = Vec::new();

        for id in unique_ids(product_ids.iter().copied()) {
            match self.cache.get(&key(id)).await {
                Some(CacheValue::Restrictions(rows)) => found.extend(rows),
                _ => misses.push(id),
            }
        }

        if misses.is_empty() {
            return Ok(found);
        }

        let mut fetched: HashMap<ProductId, Vec<ZipCodeRestriction>> = HashMap::new();
        for row in self.inner.restrictions_for_zip(&misses, zip).await? {
            fetched.entry(row.product_id).or_default().push(row);
        }

        for id in misses {
            let rows = fetched.remove(&id).unwrap_or_default();
            self.cache
                .insert(key(id), CacheValue::Restrictions(rows.clone()))
                .await;
            found.extend(rows);
        }

        Ok(found)
    }

    async fn account_tier(&self, user_id: UserId) -> Result<Option<AccountTier>, RepositoryError> {
        self.inner.account_tier(user_id).await
    }

    #[instrument(skip_all)]
    async fn active_delivery_groups(&self) -> Result<Vec<DeliveryGroup>, RepositoryError> {
        if let Some(CacheValue::ActiveGroups(groups)) = self.cache.get(&CacheKey::ActiveGroups).await {
            return Ok(groups);
        }

        let groups = self.inner.active_delivery_groups().await?;
        self.cache
            .insert(CacheKey::ActiveGroups, CacheValue::ActiveGroups(groups.clone()))
            .await;
        Ok(groups)
    }
}
