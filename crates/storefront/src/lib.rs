//! Landscape Supply Storefront - pricing and delivery rules engine.
//!
//! Everything the storefront needs to turn a cart into checkout totals:
//!
//! - [`pricing`] - account-tier price resolution
//! - [`availability`] - per-zip availability and delivery-fee overrides
//! - [`delivery`] - category to delivery-group resolution and fee aggregation
//! - [`totals`] - subtotal, delivery, tax and total composition
//! - [`tracker`] - last-write-wins tracking of in-flight totals
//!
//! # Architecture
//!
//! Catalog data lives in an external `PostgreSQL` store and is read through
//! the [`store::CatalogStore`] seam, one batched round trip per lookup kind.
//! The rules themselves are pure functions over the fetched rows; caching is
//! an explicit decorator ([`store::CachedCatalogStore`]) and never part of
//! the computation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod pricing;
pub mod state;
pub mod store;
pub mod totals;
pub mod tracker;

pub use error::{LookupStage, PricingError};
pub use state::Storefront;
pub use store::{CachedCatalogStore, CatalogStore};
pub use totals::{CartTotals, OrderTotals, TaxRate};
