//! Last-write-wins publication of cart totals while the cart keeps changing.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use landscape_supply_core::{AccountTier, Cart, Price, Quantity};
use landscape_supply_integration_tests::{Catalog, InMemoryCatalogStore, StoreCall};
use landscape_supply_storefront::tracker::TotalsTracker;
use landscape_supply_storefront::{CartTotals, Storefront, TaxRate};

type TestStorefront = Storefront<Arc<InMemoryCatalogStore>>;

fn storefront() -> (Catalog, Arc<InMemoryCatalogStore>, TestStorefront) {
    let (catalog, store) = Catalog::build();
    let store = Arc::new(store);
    let storefront = Storefront::new(Arc::clone(&store), TaxRate::DEFAULT);
    (catalog, store, storefront)
}

#[tokio::test]
async fn test_stale_totals_never_replace_newer_ones() {
    let (catalog, _, storefront) = storefront();
    let tracker: Arc<TotalsTracker> = Arc::new(TotalsTracker::new());

    let mut cart = Cart::new();
    cart.add(catalog.river_rock, Quantity::new(1).unwrap());
    let old_lines = cart.lines().to_vec();

    // The first computation is slow to come back.
    let slow = {
        let tracker = Arc::clone(&tracker);
        let storefront = storefront.clone();
        tokio::spawn(async move {
            tracker
                .track(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    storefront
                        .compute_cart_totals(&old_lines, AccountTier::Retail, None)
                        .await
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;

    cart.add(catalog.pavers, Quantity::new(1).unwrap());
    let fresh = tracker
        .track(storefront.compute_cart_totals(cart.lines(), AccountTier::Retail, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.delivery_fee, Price::from_cents(24_000));

    let stale = slow.await.unwrap().unwrap();
    assert!(stale.is_none());

    let shown: CartTotals = tracker.latest().unwrap();
    assert_eq!(shown, fresh);
}

#[tokio::test]
async fn test_failed_recompute_clears_shown_totals() {
    let (catalog, store, storefront) = storefront();
    let tracker: TotalsTracker = TotalsTracker::new();

    let mut cart = Cart::new();
    cart.add(catalog.mulch, Quantity::new(2).unwrap());
    tracker
        .track(storefront.compute_cart_totals(cart.lines(), AccountTier::Retail, None))
        .await
        .unwrap();
    assert!(tracker.latest().is_some());

    store.fail(StoreCall::DeliveryLinks);
    cart.add(catalog.pavers, Quantity::new(1).unwrap());
    let result = tracker
        .track(storefront.compute_cart_totals(cart.lines(), AccountTier::Retail, None))
        .await;

    assert!(result.is_err());
    assert!(tracker.latest().is_none());
}

#[tokio::test]
async fn test_subscribers_see_accepted_totals() {
    let (catalog, _, storefront) = storefront();
    let tracker: TotalsTracker = TotalsTracker::new();
    let mut rx = tracker.subscribe();

    let mut cart = Cart::new();
    cart.add(catalog.river_rock, Quantity::new(2).unwrap());
    tracker
        .track(storefront.compute_cart_totals(cart.lines(), AccountTier::Retail, None))
        .await
        .unwrap();

    rx.changed().await.unwrap();
    let seen = rx.borrow().clone().unwrap();
    assert_eq!(seen.total, Price::from_cents(18_825));
}
