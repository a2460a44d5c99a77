//! Integration tests for the `PostgreSQL` catalog store.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `TEST_DATABASE_URL` pointing at it (migrations are applied on first use)
//!
//! Run with: cargo test -p landscape-supply-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use landscape_supply_core::{
    AccountTier, CartLine, CategoryId, DeliveryGroupId, Price, ProductId, UserId, ZipCode,
};
use landscape_supply_storefront::db::{self, PgCatalogStore};
use landscape_supply_storefront::{CatalogStore, Storefront, TaxRate};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// Rows inserted for one test, all with fresh IDs.
struct Seeded {
    rock_category: CategoryId,
    river_rock: ProductId,
    pavers: ProductId,
    dump_truck: DeliveryGroupId,
    contractor: UserId,
}

async fn insert_category(pool: &PgPool, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO categories (name_en) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to insert category")
}

async fn insert_group(pool: &PgPool, name: &str, vehicle: &str, fee: &str) -> Uuid {
    sqlx::query_scalar(
        r"
        INSERT INTO delivery_groups (name, vehicle_type, base_fee)
        VALUES ($1, $2::vehicle_type, $3::numeric)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(vehicle)
    .bind(fee)
    .fetch_one(pool)
    .await
    .expect("Failed to insert delivery group")
}

async fn insert_product(
    pool: &PgPool,
    category: Uuid,
    name: &str,
    price: &str,
    contractor_price: Option<&str>,
) -> Uuid {
    sqlx::query_scalar(
        r"
        INSERT INTO products (category_id, name, price, contractor_price)
        VALUES ($1, $2, $3::numeric, $4::numeric)
        RETURNING id
        ",
    )
    .bind(category)
    .bind(name)
    .bind(price)
    .bind(contractor_price)
    .fetch_one(pool)
    .await
    .expect("Failed to insert product")
}

async fn seed(pool: &PgPool) -> Seeded {
    let rock = insert_category(pool, "Rock").await;
    let pavers_cat = insert_category(pool, "Pavers").await;
    let dump_truck = insert_group(pool, "Bulk materials", "dump_truck", "80.00").await;
    let flatbed = insert_group(pool, "Palletized hardscape", "flatbed", "160.00").await;

    for (category, group) in [(rock, dump_truck), (pavers_cat, flatbed)] {
        sqlx::query(
            "INSERT INTO category_delivery_groups (category_id, delivery_group_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(category)
        .bind(group)
        .bind(Utc::now() - Duration::days(1))
        .execute(pool)
        .await
        .expect("Failed to link category");
    }

    let river_rock = insert_product(pool, rock, "River rock", "50.00", Some("40.00")).await;
    let pavers = insert_product(pool, pavers_cat, "Travertine pavers", "120.00", None).await;

    sqlx::query(
        r"
        INSERT INTO zip_code_restrictions (product_id, zip_code, is_available, delivery_fee_override)
        VALUES ($1, '89052', FALSE, NULL), ($2, '89052', TRUE, 120.00)
        ",
    )
    .bind(pavers)
    .bind(river_rock)
    .execute(pool)
    .await
    .expect("Failed to insert restrictions");

    let contractor = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (user_id, account_tier) VALUES ($1, 'contractor')")
        .bind(contractor)
        .execute(pool)
        .await
        .expect("Failed to insert profile");

    Seeded {
        rock_category: CategoryId::new(rock),
        river_rock: ProductId::new(river_rock),
        pavers: ProductId::new(pavers),
        dump_truck: DeliveryGroupId::new(dump_truck),
        contractor: UserId::new(contractor),
    }
}

// ============================================================================
// Store Queries
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_products_round_trip() {
    let pool = pool().await;
    let seeded = seed(&pool).await;
    let store = PgCatalogStore::new(pool);

    let products = store
        .products_by_ids(&[seeded.river_rock, ProductId::random()])
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    let rock = &products[0];
    assert_eq!(rock.category_id, seeded.rock_category);
    assert_eq!(rock.price, Price::from_cents(5_000));
    assert_eq!(rock.contractor_price, Some(Price::from_cents(4_000)));
    assert_eq!(rock.wholesale_price, None);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_delivery_links_join_group() {
    let pool = pool().await;
    let seeded = seed(&pool).await;
    let store = PgCatalogStore::new(pool);

    let links = store
        .delivery_links_for_categories(&[seeded.rock_category])
        .await
        .unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].delivery_group.id, seeded.dump_truck);
    assert_eq!(links[0].delivery_group.base_fee, Price::from_cents(8_000));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_account_tier_lookup() {
    let pool = pool().await;
    let seeded = seed(&pool).await;
    let store = PgCatalogStore::new(pool);

    assert_eq!(
        store.account_tier(seeded.contractor).await.unwrap(),
        Some(AccountTier::Contractor)
    );
    assert_eq!(store.account_tier(UserId::random()).await.unwrap(), None);
}

// ============================================================================
// Engine
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_cart_totals_against_postgres() {
    let pool = pool().await;
    let seeded = seed(&pool).await;
    let storefront = Storefront::new(PgCatalogStore::new(pool), TaxRate::DEFAULT);

    let lines = [
        CartLine::try_new(seeded.river_rock, 2).unwrap(),
        CartLine::try_new(seeded.pavers, 1).unwrap(),
    ];

    let anywhere = storefront
        .compute_cart_totals(&lines, AccountTier::Retail, None)
        .await
        .unwrap();
    assert_eq!(anywhere.subtotal, Price::from_cents(22_000));
    assert_eq!(anywhere.delivery_fee, Price::from_cents(24_000));

    let henderson = ZipCode::parse("89052").unwrap();
    let local = storefront
        .compute_cart_totals(&lines, AccountTier::Contractor, Some(&henderson))
        .await
        .unwrap();
    assert_eq!(local.unavailable_products, vec![seeded.pavers]);
    assert_eq!(local.subtotal, Price::from_cents(20_000));
    assert_eq!(local.delivery_fee, Price::from_cents(28_000));

    let json = serde_json::to_value(&local).unwrap();
    assert_eq!(json["delivery_groups"][0]["fee_overridden"], true);
}
