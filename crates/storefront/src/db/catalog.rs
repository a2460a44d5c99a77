//! `PostgreSQL` implementation of [`CatalogStore`].
//!
//! Queries are built at runtime with `query_as` and mapped through
//! `FromRow` row structs, then validated into core types. Every lookup binds
//! its ID batch as a single `uuid[]` parameter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use landscape_supply_core::{
    AccountTier, Category, CategoryDeliveryGroup, CategoryId, DeliveryGroup, DeliveryGroupId,
    Price, Product, ProductId, UserId, VehicleType, ZipCode, ZipCodeRestriction, to_uuids,
};

use super::RepositoryError;
use crate::store::CatalogStore;

/// Catalog reads against the hosted `PostgreSQL` database.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    sku: Option<String>,
    unit: Option<String>,
    price: Decimal,
    contractor_price: Option<Decimal>,
    wholesale_price: Option<Decimal>,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name_en: String,
    name_es: String,
    sort_order: i32,
    parent_id: Option<Uuid>,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct DeliveryGroupRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    vehicle_type: VehicleType,
    base_fee: Decimal,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct CategoryLinkRow {
    category_id: Uuid,
    linked_at: DateTime<Utc>,
    #[sqlx(flatten)]
    group: DeliveryGroupRow,
}

#[derive(Debug, FromRow)]
struct RestrictionRow {
    product_id: Uuid,
    zip_code: String,
    is_available: bool,
    delivery_fee_override: Option<Decimal>,
}

/// Validate a stored amount: catalog prices and fees are never negative.
fn non_negative(amount: Decimal, what: &str, id: Uuid) -> Result<Price, RepositoryError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RepositoryError::DataCorruption(format!(
            "negative {what} {amount} on {id}"
        )));
    }
    Ok(Price::usd(amount))
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            sku: row.sku,
            unit: row.unit,
            price: non_negative(row.price, "price", row.id)?,
            contractor_price: row
                .contractor_price
                .map(|p| non_negative(p, "contractor price", row.id))
                .transpose()?,
            wholesale_price: row
                .wholesale_price
                .map(|p| non_negative(p, "wholesale price", row.id))
                .transpose()?,
            is_active: row.is_active,
        })
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name_en: row.name_en,
            name_es: row.name_es,
            sort_order: row.sort_order,
            parent_id: row.parent_id.map(CategoryId::new),
            is_active: row.is_active,
        }
    }
}

impl TryFrom<DeliveryGroupRow> for DeliveryGroup {
    type Error = RepositoryError;

    fn try_from(row: DeliveryGroupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DeliveryGroupId::new(row.id),
            base_fee: non_negative(row.base_fee, "base fee", row.id)?,
            name: row.name,
            description: row.description,
            vehicle_type: row.vehicle_type,
            is_active: row.is_active,
        })
    }
}

impl TryFrom<CategoryLinkRow> for CategoryDeliveryGroup {
    type Error = RepositoryError;

    fn try_from(row: CategoryLinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            category_id: CategoryId::new(row.category_id),
            delivery_group: row.group.try_into()?,
            created_at: row.linked_at,
        })
    }
}

impl TryFrom<RestrictionRow> for ZipCodeRestriction {
    type Error = RepositoryError;

    fn try_from(row: RestrictionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::new(row.product_id),
            delivery_fee_override: row
                .delivery_fee_override
                .map(|fee| non_negative(fee, "delivery fee override", row.product_id))
                .transpose()?,
            zip_code: row.zip_code,
            is_available: row.is_available,
        })
    }
}

// =============================================================================
// CatalogStore
// =============================================================================

impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, sku, unit,
                   price, contractor_price, wholesale_price, is_active
            FROM products
            WHERE id = ANY($1)
            ",
        )
        .bind(to_uuids(ids.iter().copied()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name_en, name_es, sort_order, parent_id, is_active
            FROM categories
            WHERE id = ANY($1)
            ",
        )
        .bind(to_uuids(ids.iter().copied()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delivery_links_for_categories(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<CategoryDeliveryGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryLinkRow>(
            r"
            SELECT cdg.category_id, cdg.created_at AS linked_at,
                   dg.id, dg.name, dg.description, dg.vehicle_type,
                   dg.base_fee, dg.is_active
            FROM category_delivery_groups cdg
            JOIN delivery_groups dg ON dg.id = cdg.delivery_group_id
            WHERE cdg.category_id = ANY($1)
            ORDER BY cdg.category_id, cdg.created_at, dg.id
            ",
        )
        .bind(to_uuids(ids.iter().copied()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CategoryDeliveryGroup::try_from).collect()
    }

    #[instrument(skip(self, product_ids, zip), fields(count = product_ids.len(), zip = %zip))]
    async fn restrictions_for_zip(
        &self,
        product_ids: &[ProductId],
        zip: &ZipCode,
    ) -> Result<Vec<ZipCodeRestriction>, RepositoryError> {
        let rows = sqlx::query_as::<_, RestrictionRow>(
            r"
            SELECT product_id, zip_code, is_available, delivery_fee_override
            FROM zip_code_restrictions
            WHERE product_id = ANY($1) AND zip_code = $2
            ",
        )
        .bind(to_uuids(product_ids.iter().copied()))
        .bind(zip.base())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ZipCodeRestriction::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn account_tier(&self, user_id: UserId) -> Result<Option<AccountTier>, RepositoryError> {
        let tier = sqlx::query_scalar::<_, AccountTier>(
            r"
            SELECT account_tier
            FROM profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tier)
    }

    #[instrument(skip(self))]
    async fn active_delivery_groups(&self) -> Result<Vec<DeliveryGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryGroupRow>(
            r"
            SELECT id, name, description, vehicle_type, base_fee, is_active
            FROM delivery_groups
            WHERE is_active = TRUE
            ORDER BY base_fee ASC, name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeliveryGroup::try_from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_row(price: Decimal) -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Desert Gold 3/4\"".to_string(),
            sku: Some("DG-075".to_string()),
            unit: Some("ton".to_string()),
            price,
            contractor_price: Some(Decimal::new(4200, 2)),
            wholesale_price: None,
            is_active: true,
        }
    }

    #[test]
    fn test_product_row_converts() {
        let product = Product::try_from(product_row(Decimal::new(4800, 2))).unwrap();
        assert_eq!(product.price, Price::from_cents(4800));
        assert_eq!(product.contractor_price, Some(Price::from_cents(4200)));
        assert_eq!(product.wholesale_price, None);
    }

    #[test]
    fn test_negative_price_is_data_corruption() {
        let err = Product::try_from(product_row(Decimal::new(-1, 0))).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_negative_override_is_data_corruption() {
        let row = RestrictionRow {
            product_id: Uuid::new_v4(),
            zip_code: "89002".to_string(),
            is_available: true,
            delivery_fee_override: Some(Decimal::new(-500, 2)),
        };
        assert!(ZipCodeRestriction::try_from(row).is_err());
    }

    #[test]
    fn test_link_row_converts_with_group() {
        let row = CategoryLinkRow {
            category_id: Uuid::new_v4(),
            linked_at: Utc::now(),
            group: DeliveryGroupRow {
                id: Uuid::new_v4(),
                name: "Bulk rock".to_string(),
                description: None,
                vehicle_type: VehicleType::DumpTruck,
                base_fee: Decimal::new(80, 0),
                is_active: true,
            },
        };
        let link = CategoryDeliveryGroup::try_from(row).unwrap();
        assert_eq!(link.delivery_group.base_fee, Price::usd(Decimal::new(80, 0)));
        assert_eq!(link.delivery_group.vehicle_type, VehicleType::DumpTruck);
    }
}
