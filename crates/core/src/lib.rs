//! HoopShop Core - Shared domain types and cart logic.
//!
//! This crate provides the types used by the storefront:
//! - catalog records (products, categories, brands) and their admin form inputs
//! - the visitor's cart state and its derived totals
//! - in-memory list filtering
//! - page route constants
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. Everything here is testable without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and roles
//! - [`catalog`] - Product, category and brand records plus validation
//! - [`cart`] - Cart lines, cart state operations, totals
//! - [`filter`] - Search and dropdown filtering
//! - [`paths`] - Page routes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod filter;
pub mod paths;
pub mod types;
pub mod user;

pub use cart::{CartLine, CartState, CartTotals};
pub use catalog::{
    Brand, BrandInput, Category, CategoryInput, FieldError, Product, ProductInput, Validate,
    ValidationErrors,
};
pub use filter::{Named, ProductFilter};
pub use types::*;
pub use user::{Registration, User};
