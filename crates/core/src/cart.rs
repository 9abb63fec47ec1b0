//! Cart lines, the per-visitor cart state, and derived totals.
//!
//! The remote API owns the persisted cart. [`CartState`] is the shop's local
//! copy: it is replaced wholesale whenever the server list is fetched and is
//! otherwise mutated by the reducer-style operations below. Nothing here talks
//! to the network; pairing a mutation with its server call is the caller's job.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Price, Product, ProductId};

/// Orders with a subtotal strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping fee charged at or below the threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Sales tax rate applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// One product and how many of it are in the cart.
///
/// On the wire (`GET /api/cart/view`) a line is a product object with an
/// extra `quantity` field, hence the flatten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The visitor's cart: an ordered list with at most one line per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from a server list, see [`CartState::replace`].
    #[must_use]
    pub fn from_server(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        cart.replace(lines);
        cart
    }

    /// Replace the whole cart with the server's list. No merge with local lines.
    ///
    /// The server is not trusted to uphold the one-line-per-product rule:
    /// duplicate ids are collapsed into the first occurrence by summing their
    /// quantities, and zero-quantity lines are dropped.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines.clear();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match self.position(line.product_id()) {
                Some(i) => {
                    if let Some(existing) = self.lines.get_mut(i) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => self.lines.push(line),
            }
        }
    }

    /// Add `quantity` of `product`.
    ///
    /// An existing line for the same product id is incremented; otherwise a
    /// new line is appended. Repeated calls keep accumulating: adding the same
    /// product twice with quantity 1 leaves quantity 2.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        match self.lines.iter_mut().find(|l| l.product_id() == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::new(product, quantity)),
        }
    }

    /// Set the quantity of the line for `product_id`. No-op when absent.
    ///
    /// Callers reject quantities below 1 before getting here.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id() == product_id) {
            line.quantity = quantity;
        }
    }

    /// Drop the line for `product_id`, if any.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id() != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.position(product_id).is_some()
    }

    /// Quantity of `product_id` in the cart, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .map_or(0, |l| l.quantity)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products (what the header badge shows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(self)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id() == product_id)
    }
}

/// Order summary derived from a cart. Never stored; recomputed per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl CartTotals {
    #[must_use]
    pub fn compute(cart: &CartState) -> Self {
        Self::from_subtotal(cart.lines().iter().map(CartLine::line_total).sum())
    }

    /// Shipping, tax and total for a given subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal.amount() > FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            Price::new(FLAT_SHIPPING_FEE)
        };
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping == Price::ZERO
    }

    /// How much more to spend to reach free shipping, when it isn't free yet.
    #[must_use]
    pub fn amount_to_free_shipping(&self) -> Option<Price> {
        if self.free_shipping() {
            None
        } else {
            Some(Price::new(FREE_SHIPPING_THRESHOLD) - self.subtotal)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{BrandId, CategoryId};

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: None,
            image: None,
            images: None,
            price: Price::from_cents(cents),
            stock: 20,
            category_id: CategoryId::new(1),
            brand_id: BrandId::new(1),
            category_name: None,
            brand_name: None,
        }
    }

    fn dollars(n: i64) -> Price {
        Price::from_cents(n * 100)
    }

    #[test]
    fn test_add_new_item_appends() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1000), 1);
        cart.add_item(product(2, 500), 2);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[1].product_id(), ProductId::new(2));
        assert_eq!(cart.quantity_of(ProductId::new(2)), 2);
    }

    #[test]
    fn test_repeated_adds_accumulate() {
        let mut cart = CartState::new();
        for qty in [1, 3, 2, 1] {
            cart.add_item(product(7, 1000), qty);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(7)), 7);
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1000), 4);
        cart.update_quantity(ProductId::new(1), 2);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1000), 1);
        let before = cart.clone();
        cart.update_quantity(ProductId::new(99), 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_then_add_starts_fresh() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1000), 5);
        cart.remove_item(ProductId::new(1));
        assert!(!cart.contains(ProductId::new(1)));
        assert_eq!(cart.quantity_of(ProductId::new(1)), 0);

        cart.update_quantity(ProductId::new(1), 9);
        assert!(cart.is_empty());

        cart.add_item(product(1, 1000), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_replace_discards_local_lines() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 1000), 1);
        cart.replace(vec![CartLine::new(product(2, 2000), 3)]);
        assert!(!cart.contains(ProductId::new(1)));
        assert_eq!(cart.quantity_of(ProductId::new(2)), 3);
    }

    #[test]
    fn test_replace_collapses_duplicates_and_zeroes() {
        let cart = CartState::from_server(vec![
            CartLine::new(product(1, 1000), 1),
            CartLine::new(product(2, 1000), 0),
            CartLine::new(product(1, 1000), 2),
        ]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 3);
    }

    #[test]
    fn test_cart_line_wire_format() {
        let json = r#"[{"id":5,"name":"Rim","price":"60.00","stock":2,
            "category_id":3,"brand_id":4,"quantity":2}]"#;
        let lines: Vec<CartLine> = serde_json::from_str(json).unwrap();
        let cart = CartState::from_server(lines);
        assert_eq!(cart.quantity_of(ProductId::new(5)), 2);
        assert_eq!(cart.lines()[0].line_total(), dollars(120));
    }

    #[test]
    fn test_totals_free_shipping_above_threshold() {
        let totals = CartTotals::from_subtotal(dollars(120));
        assert_eq!(totals.shipping, Price::ZERO);
        assert_eq!(totals.tax, Price::from_cents(960));
        assert_eq!(totals.total, Price::from_cents(12_960));
        assert!(totals.free_shipping());
        assert_eq!(totals.amount_to_free_shipping(), None);
    }

    #[test]
    fn test_totals_flat_fee_below_threshold() {
        let totals = CartTotals::from_subtotal(dollars(80));
        assert_eq!(totals.shipping, dollars(15));
        assert_eq!(totals.tax, Price::from_cents(640));
        assert_eq!(totals.total, Price::from_cents(10_140));
        assert_eq!(totals.amount_to_free_shipping(), Some(dollars(20)));
    }

    #[test]
    fn test_totals_threshold_is_exclusive() {
        let totals = CartTotals::from_subtotal(dollars(100));
        assert_eq!(totals.shipping, dollars(15));
    }

    #[test]
    fn test_totals_from_cart() {
        let mut cart = CartState::new();
        cart.add_item(product(1, 2550), 2);
        cart.add_item(product(2, 1000), 1);
        let totals = cart.totals();
        assert_eq!(totals.subtotal, dollars(61));
        assert_eq!(totals.total, totals.subtotal + totals.shipping + totals.tax);
        assert_eq!(cart.total_quantity(), 3);
    }
}
