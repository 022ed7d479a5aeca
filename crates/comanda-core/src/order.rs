//! # Orders
//!
//! A submitted cart, frozen at the prices it was sent at, tracked through the
//! kitchen.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (live)                        Order (frozen)                      │
//! │  ───────────                        ──────────────                      │
//! │  product_id: 1  ──┐                 product_id: 1                       │
//! │  quantity: 2      ├── snapshot ──►  name_snapshot: "Hambúrguer..."      │
//! │                   │   (catalog)     unit_price_cents: 2490              │
//! │                   │                 quantity: 2                         │
//! │                   │                                                     │
//! │  Menu repriced to 29.90 later ────► order still bills 24.90            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items never change after creation. Only `status` moves, and only along
//! the edges [`OrderStatus::can_transition_to`] allows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderId, OrderStatus, ProductId, TableId};

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: ProductId,

    /// Product name at submission time.
    pub name_snapshot: String,

    /// Unit price in centavos at submission time.
    pub unit_price_cents: i64,

    pub quantity: u32,
}

impl OrderItem {
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Freezes every cart line against the catalog's current name and price.
    ///
    /// ## Errors
    /// - `Validation(EmptyCart)` if the cart has no lines
    /// - `ProductNotFound` if a line's product left the catalog
    /// - `ProductUnavailable` if a product was switched off after it was
    ///   added to the cart
    pub fn snapshot_cart(cart: &Cart, catalog: &Catalog) -> CoreResult<Vec<OrderItem>> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        cart.lines()
            .iter()
            .map(|line| {
                let product = catalog.require(line.product_id)?;
                if !product.available {
                    return Err(CoreError::ProductUnavailable {
                        product_id: product.id,
                        name: product.name.clone(),
                    });
                }
                Ok(OrderItem {
                    product_id: product.id,
                    name_snapshot: product.name.clone(),
                    unit_price_cents: product.price_cents,
                    quantity: line.quantity,
                })
            })
            .collect()
    }
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Assigned by the order backend.
    id: OrderId,

    /// Table the order was placed for.
    tab_id: TableId,

    items: Vec<OrderItem>,

    status: OrderStatus,

    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Order {
    /// Builds a PENDING order from already-snapshotted items.
    pub fn new(id: OrderId, tab_id: TableId, items: Vec<OrderItem>, created_at: DateTime<Utc>) -> Self {
        Order {
            id,
            tab_id,
            items,
            status: OrderStatus::Pending,
            created_at,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn tab_id(&self) -> TableId {
        self.tab_id
    }

    /// Frozen lines, in cart order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of the frozen line totals, regardless of status.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Total the order contributes to the bill (zero once cancelled).
    pub fn billable_total(&self) -> Money {
        if self.status.is_billable() {
            self.total()
        } else {
            Money::zero()
        }
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Checks a move without applying it.
    pub fn check_transition(&self, next: OrderStatus) -> CoreResult<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                order_id: self.id,
                from: self.status,
                to: next,
            })
        }
    }

    /// Moves the order to `next`, or fails with `InvalidTransition` and
    /// leaves the status untouched.
    pub fn transition_to(&mut self, next: OrderStatus) -> CoreResult<()> {
        self.check_transition(next)?;
        self.status = next;
        Ok(())
    }

    /// Kitchen picked the order up.
    pub fn start_preparation(&mut self) -> CoreResult<()> {
        self.transition_to(OrderStatus::InProgress)
    }

    pub fn mark_ready(&mut self) -> CoreResult<()> {
        self.transition_to(OrderStatus::Ready)
    }

    pub fn mark_delivered(&mut self) -> CoreResult<()> {
        self.transition_to(OrderStatus::Delivered)
    }

    pub fn cancel(&mut self) -> CoreResult<()> {
        self.transition_to(OrderStatus::Cancelled)
    }
}
