//! Per-zip product filtering and availability checks.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use landscape_supply_core::{Price, Product};
use landscape_supply_integration_tests::{
    Catalog, HENDERSON, InMemoryCatalogStore, LAS_VEGAS, StoreCall, zip,
};
use landscape_supply_storefront::availability::Availability;
use landscape_supply_storefront::{CatalogStore, Storefront, TaxRate};

fn storefront() -> (Catalog, Arc<InMemoryCatalogStore>, Storefront<Arc<InMemoryCatalogStore>>) {
    let (catalog, store) = Catalog::build();
    let store = Arc::new(store);
    let storefront = Storefront::new(Arc::clone(&store), TaxRate::DEFAULT);
    (catalog, store, storefront)
}

/// A category listing in display order.
async fn listing(store: &InMemoryCatalogStore, catalog: &Catalog) -> Vec<Product> {
    let ids = [catalog.pavers, catalog.river_rock, catalog.planter, catalog.mulch];
    let mut products = store.products_by_ids(&ids).await.unwrap();
    products.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
    store.reset_calls();
    products
}

#[tokio::test]
async fn test_unavailable_product_is_filtered_out() {
    let (catalog, store, storefront) = storefront();
    let products = listing(&store, &catalog).await;

    let available = storefront
        .filter_products_for_zip(products, &zip(HENDERSON))
        .await
        .unwrap();

    let ids: Vec<_> = available.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![catalog.river_rock, catalog.planter, catalog.mulch]);
    assert_eq!(store.calls(StoreCall::Restrictions), 1);
}

#[tokio::test]
async fn test_zip_without_rows_passes_everything_through() {
    let (catalog, store, storefront) = storefront();
    let products = listing(&store, &catalog).await;

    let available = storefront
        .filter_products_for_zip(products.clone(), &zip(LAS_VEGAS))
        .await
        .unwrap();

    assert_eq!(available, products);
}

#[tokio::test]
async fn test_inactive_products_are_filtered_out() {
    let (catalog, store, storefront) = storefront();
    let products = store
        .products_by_ids(&[catalog.edging, catalog.mulch])
        .await
        .unwrap();

    let available = storefront
        .filter_products_for_zip(products, &zip(LAS_VEGAS))
        .await
        .unwrap();

    let ids: Vec<_> = available.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![catalog.mulch]);
}

#[tokio::test]
async fn test_only_inactive_products_need_no_lookup() {
    let (catalog, store, storefront) = storefront();
    let products = store.products_by_ids(&[catalog.edging]).await.unwrap();
    store.reset_calls();

    let available = storefront
        .filter_products_for_zip(products, &zip(HENDERSON))
        .await
        .unwrap();

    assert!(available.is_empty());
    assert_eq!(store.calls(StoreCall::Restrictions), 0);
}

#[tokio::test]
async fn test_empty_listing_needs_no_lookup() {
    let (_, store, storefront) = storefront();

    let available = storefront
        .filter_products_for_zip(Vec::new(), &zip(HENDERSON))
        .await
        .unwrap();

    assert!(available.is_empty());
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_check_availability() {
    let (catalog, _, storefront) = storefront();
    let henderson = zip(HENDERSON);

    let pavers = storefront
        .check_availability(catalog.pavers, &henderson)
        .await
        .unwrap();
    assert!(!pavers.is_available);

    let rock = storefront
        .check_availability(catalog.river_rock, &henderson)
        .await
        .unwrap();
    assert!(rock.is_available);
    assert_eq!(rock.delivery_fee_override, Some(Price::from_cents(12_000)));

    let mulch = storefront
        .check_availability(catalog.mulch, &henderson)
        .await
        .unwrap();
    assert_eq!(mulch, Availability::UNRESTRICTED);
}

#[tokio::test]
async fn test_failed_restriction_lookup_is_an_error() {
    let (catalog, store, storefront) = storefront();
    let products = listing(&store, &catalog).await;
    store.fail(StoreCall::Restrictions);

    let result = storefront
        .filter_products_for_zip(products, &zip(HENDERSON))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_delivery_group_for_product() {
    let (catalog, _, storefront) = storefront();

    let group = storefront
        .delivery_group_for_product(catalog.pavers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(group.id, catalog.flatbed);

    let none = storefront
        .delivery_group_for_product(catalog.planter)
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn test_delivery_groups_cheapest_first() {
    let (catalog, _, storefront) = storefront();

    let groups = storefront.delivery_groups().await.unwrap();

    let ids: Vec<_> = groups.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![catalog.dump_truck, catalog.flatbed]);
}
