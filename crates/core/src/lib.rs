//! Landscape Supply Core - Shared domain types.
//!
//! This crate provides the types used across all Landscape Supply components:
//! - `storefront` - Pricing, availability and delivery-fee rules engine
//! - `cli` - Command-line tools for migrations and quoting carts
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, zip codes,
//!   quantities, and enumerated tiers
//! - [`catalog`] - Catalog entities as read from the external store
//! - [`cart`] - Cart lines and the in-session cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartLine};
pub use catalog::{Category, CategoryDeliveryGroup, DeliveryGroup, Product, ZipCodeRestriction};
pub use types::*;
