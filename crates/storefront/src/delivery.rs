//! Delivery-group resolution and delivery-fee aggregation.
//!
//! Each category ships on at most one delivery group (one vehicle type, one
//! flat fee). A cart pays each distinct group's fee once, however many units
//! or products share that group. Products whose category has no group ride
//! along for free.
//!
//! # Zip overrides
//!
//! When the customer's zip code carries a delivery-fee override for a
//! product, the override replaces the fee of that product's group. If several
//! products in one group carry overrides, the largest is charged.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use landscape_supply_core::{
    CartLine, CategoryDeliveryGroup, CategoryId, DeliveryGroup, Price, Product, ProductId,
};

use crate::availability::FeeOverrides;
use crate::error::{LookupStage, PricingError, Result};
use crate::store::{CatalogStore, ProductIndex, fetch_product_index, unique_ids};

// =============================================================================
// Group resolution
// =============================================================================

/// Category to delivery-group mapping built from link rows.
#[derive(Debug, Clone, Default)]
pub struct GroupResolver {
    by_category: HashMap<CategoryId, DeliveryGroup>,
}

impl GroupResolver {
    /// Build the mapping. Links to inactive groups are skipped. A category
    /// linked to several active groups keeps the earliest link (by creation
    /// time, then group ID) and the anomaly is logged.
    #[must_use]
    pub fn from_links(links: impl IntoIterator<Item = CategoryDeliveryGroup>) -> Self {
        let mut links: Vec<CategoryDeliveryGroup> = links
            .into_iter()
            .filter(|link| {
                if !link.delivery_group.is_active {
                    debug!(
                        category_id = %link.category_id,
                        group_id = %link.delivery_group.id,
                        "skipping inactive delivery group"
                    );
                }
                link.delivery_group.is_active
            })
            .collect();
        links.sort_by(|a, b| {
            (a.category_id, a.created_at, a.delivery_group.id)
                .cmp(&(b.category_id, b.created_at, b.delivery_group.id))
        });

        let mut by_category: HashMap<CategoryId, DeliveryGroup> = HashMap::new();
        for link in links {
            if let Some(kept) = by_category.get(&link.category_id) {
                warn!(
                    category_id = %link.category_id,
                    kept_group = %kept.id,
                    ignored_group = %link.delivery_group.id,
                    "category linked to multiple delivery groups"
                );
                continue;
            }
            by_category.insert(link.category_id, link.delivery_group);
        }

        Self { by_category }
    }

    /// The delivery group for a category, if any.
    #[must_use]
    pub fn resolve(&self, category_id: CategoryId) -> Option<&DeliveryGroup> {
        self.by_category.get(&category_id)
    }
}

/// Load the group mapping for a batch of categories.
///
/// Categories and links are fetched concurrently; categories the store does
/// not know are logged as anomalies and resolve to no group.
///
/// # Errors
///
/// Returns [`PricingError::DeliveryFeeUnavailable`] if either lookup fails.
#[instrument(skip(store, category_ids), fields(count = category_ids.len()))]
pub async fn load_group_resolver<S: CatalogStore>(
    store: &S,
    category_ids: &[CategoryId],
) -> Result<GroupResolver> {
    let ids = unique_ids(category_ids.iter().copied());
    if ids.is_empty() {
        return Ok(GroupResolver::default());
    }

    let (categories, links) = tokio::try_join!(
        async {
            store
                .categories_by_ids(&ids)
                .await
                .map_err(|e| PricingError::lookup(LookupStage::Categories, e))
        },
        async {
            store
                .delivery_links_for_categories(&ids)
                .await
                .map_err(|e| PricingError::lookup(LookupStage::DeliveryGroups, e))
        },
    )?;

    let known: HashSet<CategoryId> = categories.iter().map(|c| c.id).collect();
    for missing in ids.iter().filter(|id| !known.contains(id)) {
        warn!(category_id = %missing, "product references unknown category");
    }
    debug!(categories = categories.len(), links = links.len(), "loaded delivery links");

    Ok(GroupResolver::from_links(links))
}

/// The delivery group for one category.
///
/// # Errors
///
/// Returns [`PricingError::DeliveryFeeUnavailable`] if the lookup fails.
pub async fn resolve_group<S: CatalogStore>(
    store: &S,
    category_id: CategoryId,
) -> Result<Option<DeliveryGroup>> {
    let resolver = load_group_resolver(store, &[category_id]).await?;
    Ok(resolver.resolve(category_id).cloned())
}

/// The delivery group a product ships on (product, then category, then group).
///
/// # Errors
///
/// Returns [`PricingError::MissingProduct`] for an unknown product and
/// [`PricingError::DeliveryFeeUnavailable`] if a lookup fails.
pub async fn delivery_group_for_product<S: CatalogStore>(
    store: &S,
    product_id: ProductId,
) -> Result<Option<DeliveryGroup>> {
    let products = fetch_product_index(store, [product_id])
        .await
        .map_err(PricingError::DeliveryFeeUnavailable)?;
    let product = products
        .get(&product_id)
        .ok_or(PricingError::MissingProduct(product_id))?;
    resolve_group(store, product.category_id).await
}

/// All active delivery groups, cheapest first.
///
/// # Errors
///
/// Returns [`PricingError::Lookup`] if the lookup fails.
pub async fn active_delivery_groups<S: CatalogStore>(store: &S) -> Result<Vec<DeliveryGroup>> {
    let mut groups = store
        .active_delivery_groups()
        .await
        .map_err(|source| PricingError::Lookup {
            stage: LookupStage::DeliveryGroups,
            source,
        })?;
    groups.retain(|g| g.is_active);
    groups.sort_by(|a, b| {
        a.base_fee
            .amount
            .cmp(&b.base_fee.amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(groups)
}

// =============================================================================
// Aggregation
// =============================================================================

/// One delivery group required by a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryGroupLine {
    pub group: DeliveryGroup,
    /// Units across all lines in this group (display only; not billed).
    pub unit_count: u64,
    /// Distinct products in this group.
    pub product_count: usize,
    /// Fee charged once for this group.
    pub fee: Price,
    /// Whether `fee` came from a zip-level override.
    pub fee_overridden: bool,
}

impl DeliveryGroupLine {
    fn new(group: DeliveryGroup) -> Self {
        Self {
            fee: group.base_fee,
            group,
            unit_count: 0,
            product_count: 0,
            fee_overridden: false,
        }
    }

    fn apply_override(&mut self, fee: Price) {
        if !self.fee_overridden || fee.amount > self.fee.amount {
            self.fee = fee;
        }
        self.fee_overridden = true;
    }
}

/// Delivery groups a cart needs and the total delivery fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryQuote {
    /// Groups in order of first appearance in the cart.
    pub groups: Vec<DeliveryGroupLine>,
    pub total_fee: Price,
}

impl DeliveryQuote {
    /// No groups, zero fee.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            total_fee: Price::zero(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Aggregate already-fetched lines into a quote.
///
/// Lines whose category resolves to no group contribute nothing.
#[must_use]
pub fn aggregate_lines<'a, I>(lines: I, resolver: &GroupResolver, overrides: &FeeOverrides) -> DeliveryQuote
where
    I: IntoIterator<Item = (&'a CartLine, &'a Product)>,
{
    let mut groups: Vec<DeliveryGroupLine> = Vec::new();
    let mut products_seen: HashSet<ProductId> = HashSet::new();

    for (line, product) in lines {
        let Some(group) = resolver.resolve(product.category_id) else {
            continue;
        };

        let pos = groups
            .iter()
            .position(|g| g.group.id == group.id)
            .unwrap_or_else(|| {
                groups.push(DeliveryGroupLine::new(group.clone()));
                groups.len() - 1
            });
        let Some(entry) = groups.get_mut(pos) else {
            continue;
        };

        entry.unit_count += u64::from(line.quantity.get());
        if products_seen.insert(product.id) {
            entry.product_count += 1;
        }
        if let Some(fee) = overrides.get(product.id) {
            entry.apply_override(fee);
        }
    }

    let total_fee = groups.iter().map(|g| g.fee).sum();
    DeliveryQuote { groups, total_fee }
}

/// Aggregate a cart whose products have already been fetched.
///
/// # Errors
///
/// Returns [`PricingError::MissingProduct`] if a line's product is not in
/// `products`, and [`PricingError::DeliveryFeeUnavailable`] if the category
/// or group lookups fail.
pub async fn aggregate_for_products<S: CatalogStore>(
    store: &S,
    lines: &[CartLine],
    products: &ProductIndex,
    overrides: &FeeOverrides,
) -> Result<DeliveryQuote> {
    if lines.is_empty() {
        return Ok(DeliveryQuote::empty());
    }

    let resolved = lines
        .iter()
        .map(|line| {
            products
                .get(&line.product_id)
                .map(|product| (line, product))
                .ok_or(PricingError::MissingProduct(line.product_id))
        })
        .collect::<Result<Vec<_>>>()?;

    let category_ids: Vec<CategoryId> = resolved.iter().map(|(_, p)| p.category_id).collect();
    let resolver = load_group_resolver(store, &category_ids).await?;

    Ok(aggregate_lines(resolved, &resolver, overrides))
}

/// Compute the delivery groups and total delivery fee for a cart.
///
/// An empty cart returns immediately without touching the store.
///
/// # Errors
///
/// Returns [`PricingError::DeliveryFeeUnavailable`] if any lookup fails and
/// [`PricingError::MissingProduct`] for an unknown product. A failure is
/// never reported as a zero fee.
#[instrument(skip(store, lines, overrides), fields(lines = lines.len()))]
pub async fn aggregate<S: CatalogStore>(
    store: &S,
    lines: &[CartLine],
    overrides: &FeeOverrides,
) -> Result<DeliveryQuote> {
    if lines.is_empty() {
        return Ok(DeliveryQuote::empty());
    }

    let products = fetch_product_index(store, lines.iter().map(|l| l.product_id))
        .await
        .map_err(PricingError::DeliveryFeeUnavailable)?;

    aggregate_for_products(store, lines, &products, overrides).await
}
