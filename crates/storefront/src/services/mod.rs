//! Business logic services for the storefront.
//!
//! - `cart` - Session cart kept in step with the server cart

pub mod cart;

pub use cart::CartService;
