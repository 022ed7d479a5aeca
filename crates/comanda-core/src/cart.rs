//! # Cart
//!
//! The in-progress selection for one ordering pass at one table.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Waiter Action            Cart Method                State Change       │
//! │  ─────────────            ───────────                ────────────       │
//! │                                                                         │
//! │  Tap product ────────────► add_or_increment() ─────► line.qty += n     │
//! │                                                      (or push line)     │
//! │                                                                         │
//! │  Swipe line away ────────► remove_line() ──────────► lines.retain(..)  │
//! │                                                                         │
//! │  "Cancel order" ─────────► clear() ────────────────► lines.clear()     │
//! │                                                                         │
//! │  Footer total ───────────► subtotal(&catalog) ─────► (read only)       │
//! │                                                                         │
//! │  "Send to kitchen" ──────► Order::from_cart() ─────► (read only; the   │
//! │                            caller clears on success)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Live Pricing
//! A cart line stores only the product id and quantity. The subtotal is
//! always computed against the catalog snapshot passed in, so the footer
//! reflects the current menu price. Prices are frozen later, when the cart
//! is turned into an [`Order`](crate::order::Order).

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ProductId, TableId};
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// One product and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,

    /// Always ≥ 1; a line that would drop to zero is removed instead.
    pub quantity: u32,
}

impl CartLine {
    /// Line total at the catalog's current price.
    pub fn line_total(&self, catalog: &Catalog) -> CoreResult<Money> {
        let product = catalog.require(self.product_id)?;
        Ok(product.price() * self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again increases quantity)
/// - Every quantity is between 1 and MAX_LINE_QUANTITY
/// - At most MAX_CART_LINES distinct lines
/// - Line order is insertion order (display only; totals ignore it)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    table_id: TableId,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart for a table.
    pub fn new(table_id: TableId) -> Self {
        Cart {
            table_id,
            lines: Vec::new(),
        }
    }

    /// Table the cart is being built for.
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Adds a product or increases the quantity of its existing line.
    ///
    /// ## Errors
    /// - `Validation(InvalidQuantity)` if `quantity` ≤ 0
    /// - `ProductUnavailable` if the product is switched off in the menu
    /// - `QuantityTooLarge` if the line would exceed MAX_LINE_QUANTITY
    /// - `CartTooLarge` if a new line would exceed MAX_CART_LINES
    ///
    /// The cart is unchanged when an error is returned.
    pub fn add_or_increment(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        let quantity = validate_quantity(quantity)?;

        if !product.available {
            return Err(CoreError::ProductUnavailable {
                product_id: product.id,
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity as u64 + quantity as u64;
            if new_qty > MAX_LINE_QUANTITY as u64 {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty as u32;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product_id: product.id,
            quantity,
        });
        Ok(())
    }

    /// Removes the line for a product. Absent products are ignored.
    pub fn remove_line(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Empties the cart ("cancel order" before submission).
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Subtotal at the catalog's current prices.
    ///
    /// ## Errors
    /// `ProductNotFound` if a line refers to a product the snapshot no
    /// longer contains.
    pub fn subtotal(&self, catalog: &Catalog) -> CoreResult<Money> {
        self.lines
            .iter()
            .map(|line| line.line_total(catalog))
            .sum::<CoreResult<Money>>()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity currently selected for a product (0 if absent).
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::MAX_PRICE_CENTS;

    fn product(id: u32, price_cents: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            price_cents,
            category: "Pratos".to_string(),
            available: true,
        }
    }

    fn catalog(products: &[Product]) -> Catalog {
        Catalog::new(products.to_vec()).unwrap()
    }

    #[test]
    fn test_add_item() {
        let burger = product(1, 2490);
        let mut cart = Cart::new(5);

        cart.add_or_increment(&burger, 2).unwrap();

        assert_eq!(cart.table_id(), 5);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(&catalog(&[burger])).unwrap().cents(), 4980);
    }

    #[test]
    fn test_same_product_increments_instead_of_duplicating() {
        let burger = product(1, 2490);
        let mut cart = Cart::new(5);

        for qty in [1, 3, 2, 4] {
            cart.add_or_increment(&burger, qty).unwrap();
        }

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of(1), 10);
    }

    #[test]
    fn test_rejects_non_positive_quantity_without_change() {
        let burger = product(1, 2490);
        let mut cart = Cart::new(5);
        cart.add_or_increment(&burger, 2).unwrap();
        let before = cart.clone();

        for qty in [0, -1, -50] {
            let err = cart.add_or_increment(&burger, qty).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::InvalidQuantity { .. })
            ));
        }

        assert_eq!(cart, before);
    }

    #[test]
    fn test_rejects_unavailable_product() {
        let mut picanha = product(3, 8900);
        picanha.available = false;
        let mut cart = Cart::new(1);

        let err = cart.add_or_increment(&picanha, 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductUnavailable { product_id: 3, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_quantity_cap() {
        let water = product(9, 400);
        let mut cart = Cart::new(1);
        cart.add_or_increment(&water, 999).unwrap();

        let err = cart.add_or_increment(&water, 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.quantity_of(9), 999);
    }

    #[test]
    fn test_cart_line_cap() {
        let mut cart = Cart::new(1);
        for id in 1..=MAX_CART_LINES as u32 {
            cart.add_or_increment(&product(id, 100), 1).unwrap();
        }

        let err = cart
            .add_or_increment(&product(MAX_CART_LINES as u32 + 1, 100), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
        assert_eq!(cart.line_count(), MAX_CART_LINES);
    }

    #[test]
    fn test_remove_line_and_absent_is_noop() {
        let mut cart = Cart::new(1);
        cart.add_or_increment(&product(1, 2490), 1).unwrap();
        cart.add_or_increment(&product(2, 600), 1).unwrap();

        cart.remove_line(1);
        cart.remove_line(42);

        assert_eq!(cart.lines(), &[CartLine { product_id: 2, quantity: 1 }]);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new(1);
        cart.add_or_increment(&product(1, 2490), 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_subtotal_uses_live_price() {
        let mut cart = Cart::new(5);
        cart.add_or_increment(&product(1, 2490), 2).unwrap();
        cart.add_or_increment(&product(2, 600), 1).unwrap();

        let before = catalog(&[product(1, 2490), product(2, 600)]);
        assert_eq!(cart.subtotal(&before).unwrap().cents(), 5580);

        // Menu repriced while the waiter is still building the cart
        let after = catalog(&[product(1, 2990), product(2, 600)]);
        assert_eq!(cart.subtotal(&after).unwrap().cents(), 6580);
    }

    #[test]
    fn test_full_cart_at_max_price() {
        let products: Vec<_> = (1..=MAX_CART_LINES as u32)
            .map(|id| product(id, MAX_PRICE_CENTS))
            .collect();
        let mut cart = Cart::new(5);
        for p in &products {
            cart.add_or_increment(p, MAX_LINE_QUANTITY as i64).unwrap();
        }

        let expected = MAX_PRICE_CENTS * MAX_LINE_QUANTITY as i64 * MAX_CART_LINES as i64;
        assert_eq!(cart.subtotal(&catalog(&products)).unwrap().cents(), expected);
    }

    #[test]
    fn test_catalog_rejects_price_that_would_overflow_totals() {
        let err = Catalog::new(vec![product(1, i64::MAX / 2 + 1)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_subtotal_fails_for_product_missing_from_catalog() {
        let mut cart = Cart::new(5);
        cart.add_or_increment(&product(7, 1000), 1).unwrap();

        let err = cart.subtotal(&catalog(&[product(1, 2490)])).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(7)));
    }
}
