//! Catalog entities as read from the hosted store.
//!
//! These are read-only snapshots: the rules engine never mutates them and
//! fetches them fresh for every computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, DeliveryGroupId, Price, ProductId, VehicleType};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub sku: Option<String>,
    /// Selling unit shown next to the price ("ton", "pallet", "each").
    pub unit: Option<String>,
    /// Retail (base) price.
    pub price: Price,
    pub contractor_price: Option<Price>,
    pub wholesale_price: Option<Price>,
    pub is_active: bool,
}

impl Product {
    /// Create an active product with only a base price.
    #[must_use]
    pub fn new(id: ProductId, category_id: CategoryId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            category_id,
            name: name.into(),
            sku: None,
            unit: None,
            price,
            contractor_price: None,
            wholesale_price: None,
            is_active: true,
        }
    }

    /// Set the contractor price column.
    #[must_use]
    pub fn with_contractor_price(mut self, price: Price) -> Self {
        self.contractor_price = Some(price);
        self
    }

    /// Set the wholesale price column.
    #[must_use]
    pub fn with_wholesale_price(mut self, price: Price) -> Self {
        self.wholesale_price = Some(price);
        self
    }
}

/// A product category (rock, pavers, irrigation, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name_en: String,
    pub name_es: String,
    pub sort_order: i32,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
}

impl Category {
    /// Create an active top-level category with the same name in both languages.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            name_es: name.clone(),
            name_en: name,
            sort_order: 0,
            parent_id: None,
            is_active: true,
        }
    }
}

/// A bucket of categories that ship on one vehicle type for one flat fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryGroup {
    pub id: DeliveryGroupId,
    pub name: String,
    pub description: Option<String>,
    pub vehicle_type: VehicleType,
    /// Flat dispatch fee, independent of load size.
    pub base_fee: Price,
    pub is_active: bool,
}

impl DeliveryGroup {
    /// Create an active delivery group.
    #[must_use]
    pub fn new(
        id: DeliveryGroupId,
        name: impl Into<String>,
        vehicle_type: VehicleType,
        base_fee: Price,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            vehicle_type,
            base_fee,
            is_active: true,
        }
    }
}

/// Link between a category and the delivery group that ships it, joined with
/// the group row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDeliveryGroup {
    pub category_id: CategoryId,
    pub delivery_group: DeliveryGroup,
    /// Stable tie-break key when a category is (wrongly) linked twice.
    pub created_at: DateTime<Utc>,
}

/// Per-zip availability and fee override for one product.
///
/// No row for a (product, zip) pair means "available, no override".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCodeRestriction {
    pub product_id: ProductId,
    /// Five-digit base zip code.
    pub zip_code: String,
    pub is_available: bool,
    pub delivery_fee_override: Option<Price>,
}
