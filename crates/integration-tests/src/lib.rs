//! Integration tests for the Landscape Supply pricing engine.
//!
//! # Running Tests
//!
//! ```bash
//! # Engine tests against the in-memory catalog
//! cargo test -p landscape-supply-integration-tests
//!
//! # PostgreSQL-backed tests (requires TEST_DATABASE_URL)
//! cargo test -p landscape-supply-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_totals` - End-to-end cart pricing scenarios
//! - `availability` - Per-zip filtering and overrides
//! - `cached_store` - Catalog cache hit/miss behaviour
//! - `tracker` - Last-write-wins publication of totals
//! - `pg_catalog` - `PostgreSQL` catalog store (ignored by default)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use landscape_supply_core::{
    AccountTier, Category, CategoryDeliveryGroup, CategoryId, DeliveryGroup, DeliveryGroupId,
    Price, Product, ProductId, UserId, VehicleType, ZipCode, ZipCodeRestriction,
};
use landscape_supply_storefront::CatalogStore;
use landscape_supply_storefront::db::RepositoryError;

/// One kind of catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Products,
    Categories,
    DeliveryLinks,
    Restrictions,
    AccountTier,
    ActiveGroups,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<StoreCall>,
    requested_products: Vec<usize>,
    failing: Vec<StoreCall>,
}

/// A [`CatalogStore`] over in-memory rows that records every lookup and can
/// be told to fail specific lookups.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    links: Vec<CategoryDeliveryGroup>,
    restrictions: Vec<ZipCodeRestriction>,
    profiles: HashMap<UserId, AccountTier>,
    journal: Mutex<Journal>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id, product);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category.id, category);
        self
    }

    /// Link a category to a delivery group.
    #[must_use]
    pub fn with_link(
        mut self,
        category_id: CategoryId,
        group: DeliveryGroup,
        created_at: DateTime<Utc>,
    ) -> Self {
        self.links.push(CategoryDeliveryGroup {
            category_id,
            delivery_group: group,
            created_at,
        });
        self
    }

    #[must_use]
    pub fn with_restriction(
        mut self,
        product_id: ProductId,
        zip: &str,
        is_available: bool,
        delivery_fee_override: Option<Price>,
    ) -> Self {
        self.restrictions.push(ZipCodeRestriction {
            product_id,
            zip_code: zip.to_owned(),
            is_available,
            delivery_fee_override,
        });
        self
    }

    #[must_use]
    pub fn with_profile(mut self, user_id: UserId, tier: AccountTier) -> Self {
        self.profiles.insert(user_id, tier);
        self
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent lookup of this kind fail.
    pub fn fail(&self, call: StoreCall) {
        self.journal().failing.push(call);
    }

    /// Stop failing lookups.
    pub fn heal(&self) {
        self.journal().failing.clear();
    }

    /// Number of lookups of one kind so far.
    #[must_use]
    pub fn calls(&self, call: StoreCall) -> usize {
        self.journal().calls.iter().filter(|c| **c == call).count()
    }

    /// Number of lookups of any kind so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.journal().calls.len()
    }

    /// Batch sizes of every product lookup so far.
    #[must_use]
    pub fn requested_product_batches(&self) -> Vec<usize> {
        self.journal().requested_products.clone()
    }

    pub fn reset_calls(&self) {
        let mut journal = self.journal();
        journal.calls.clear();
        journal.requested_products.clear();
    }

    fn record(&self, call: StoreCall) -> Result<(), RepositoryError> {
        let mut journal = self.journal();
        journal.calls.push(call);
        if journal.failing.contains(&call) {
            return Err(RepositoryError::Unavailable(format!("{call:?} lookup timed out")));
        }
        Ok(())
    }
}

impl CatalogStore for InMemoryCatalogStore {
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        self.record(StoreCall::Products)?;
        self.journal().requested_products.push(ids.len());
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .collect())
    }

    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError> {
        self.record(StoreCall::Categories)?;
        Ok(ids
            .iter()
            .filter_map(|id| self.categories.get(id).cloned())
            .collect())
    }

    async fn delivery_links_for_categories(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<CategoryDeliveryGroup>, RepositoryError> {
        self.record(StoreCall::DeliveryLinks)?;
        Ok(self
            .links
            .iter()
            .filter(|link| ids.contains(&link.category_id))
            .cloned()
            .collect())
    }

    async fn restrictions_for_zip(
        &self,
        product_ids: &[ProductId],
        zip: &ZipCode,
    ) -> Result<Vec<ZipCodeRestriction>, RepositoryError> {
        self.record(StoreCall::Restrictions)?;
        Ok(self
            .restrictions
            .iter()
            .filter(|r| r.zip_code == zip.base() && product_ids.contains(&r.product_id))
            .cloned()
            .collect())
    }

    async fn account_tier(&self, user_id: UserId) -> Result<Option<AccountTier>, RepositoryError> {
        self.record(StoreCall::AccountTier)?;
        Ok(self.profiles.get(&user_id).copied())
    }

    async fn active_delivery_groups(&self) -> Result<Vec<DeliveryGroup>, RepositoryError> {
        self.record(StoreCall::ActiveGroups)?;
        let mut groups: Vec<DeliveryGroup> = Vec::new();
        for link in &self.links {
            if link.delivery_group.is_active && !groups.iter().any(|g| g.id == link.delivery_group.id) {
                groups.push(link.delivery_group.clone());
            }
        }
        Ok(groups)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Zip code with restriction rows in [`Catalog`].
pub const HENDERSON: &str = "89052";
/// Zip code with no restriction rows.
pub const LAS_VEGAS: &str = "89101";

/// A small yard catalog:
///
/// | product       | category   | group              | price | contractor |
/// |---------------|------------|--------------------|-------|------------|
/// | `river_rock`  | rock       | dump truck, $80    | $50   | $40        |
/// | `crushed_rock`| rock       | dump truck, $80    | $30   |            |
/// | `mulch`       | soil       | dump truck, $80    | $25   |            |
/// | `pavers`      | pavers     | flatbed, $160      | $120  | $100       |
/// | `planter`     | decor      | none               | $35   |            |
/// | `edging`      | rock       | dump truck, $80    | $15   |            |
/// | `boulder`     | (missing)  | none               | $200  |            |
///
/// At [`HENDERSON`], `pavers` are unavailable and `river_rock` has a $120
/// delivery-fee override. `edging` is retired (inactive). `boulder` points at
/// a category the store does not have.
#[derive(Debug)]
pub struct Catalog {
    pub river_rock: ProductId,
    pub crushed_rock: ProductId,
    pub mulch: ProductId,
    pub pavers: ProductId,
    pub planter: ProductId,
    pub edging: ProductId,
    pub boulder: ProductId,
    pub dump_truck: DeliveryGroupId,
    pub flatbed: DeliveryGroupId,
    pub contractor: UserId,
}

impl Catalog {
    /// Build the catalog and a store holding it.
    #[must_use]
    pub fn build() -> (Self, InMemoryCatalogStore) {
        let rock = CategoryId::random();
        let soil = CategoryId::random();
        let pavers_cat = CategoryId::random();
        let decor = CategoryId::random();

        let dump_truck = DeliveryGroup::new(
            DeliveryGroupId::random(),
            "Bulk materials",
            VehicleType::DumpTruck,
            Price::from_cents(8_000),
        );
        let flatbed = DeliveryGroup::new(
            DeliveryGroupId::random(),
            "Palletized hardscape",
            VehicleType::Flatbed,
            Price::from_cents(16_000),
        );

        let catalog = Self {
            river_rock: ProductId::random(),
            crushed_rock: ProductId::random(),
            mulch: ProductId::random(),
            pavers: ProductId::random(),
            planter: ProductId::random(),
            edging: ProductId::random(),
            boulder: ProductId::random(),
            dump_truck: dump_truck.id,
            flatbed: flatbed.id,
            contractor: UserId::random(),
        };

        let mut edging = Product::new(
            catalog.edging,
            rock,
            "Steel edging",
            Price::from_cents(1_500),
        );
        edging.is_active = false;

        let linked_at = Utc::now() - Duration::days(30);
        let store = InMemoryCatalogStore::new()
            .with_category(Category::new(rock, "Rock"))
            .with_category(Category::new(soil, "Soil & mulch"))
            .with_category(Category::new(pavers_cat, "Pavers"))
            .with_category(Category::new(decor, "Decor"))
            .with_link(rock, dump_truck.clone(), linked_at)
            .with_link(soil, dump_truck, linked_at)
            .with_link(pavers_cat, flatbed, linked_at)
            .with_product(
                Product::new(catalog.river_rock, rock, "River rock", Price::from_cents(5_000))
                    .with_contractor_price(Price::from_cents(4_000)),
            )
            .with_product(Product::new(
                catalog.crushed_rock,
                rock,
                "Crushed rock",
                Price::from_cents(3_000),
            ))
            .with_product(Product::new(catalog.mulch, soil, "Mulch", Price::from_cents(2_500)))
            .with_product(
                Product::new(catalog.pavers, pavers_cat, "Travertine pavers", Price::from_cents(12_000))
                    .with_contractor_price(Price::from_cents(10_000)),
            )
            .with_product(Product::new(
                catalog.planter,
                decor,
                "Glazed planter",
                Price::from_cents(3_500),
            ))
            .with_product(edging)
            .with_product(Product::new(
                catalog.boulder,
                CategoryId::random(),
                "Accent boulder",
                Price::from_cents(20_000),
            ))
            .with_restriction(catalog.pavers, HENDERSON, false, None)
            .with_restriction(catalog.river_rock, HENDERSON, true, Some(Price::from_cents(12_000)))
            .with_profile(catalog.contractor, AccountTier::Contractor);

        (catalog, store)
    }
}

/// Parse a zip code fixture.
///
/// # Panics
///
/// Panics if `zip` is not a valid zip code.
#[must_use]
#[allow(clippy::expect_used)]
pub fn zip(zip: &str) -> ZipCode {
    ZipCode::parse(zip).expect("fixture zip code is valid")
}
