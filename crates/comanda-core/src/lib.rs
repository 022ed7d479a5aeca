//! # comanda-core: Pure Business Logic for Comanda
//!
//! This crate holds every table-service rule as pure functions and plain
//! data: carts, orders, tabs and billing. Nothing here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Comanda Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Waiter / Kitchen / Cashier UI                  │   │
//! │  │     Menu ──► Cart ──► Send to kitchen ──► Bill ──► Close        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  comanda-engine (async)                         │   │
//! │  │   TableService, TabRegistry, ports, timeouts, retry, config     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ comanda-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ catalog │ │  cart   │ │  order  │ │   tab   │ │ billing │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌─────────┐           │   │
//! │  │   │  money  │ │  types  │ │ validation │ │  error  │           │   │
//! │  │   └─────────┘ └─────────┘ └────────────┘ └─────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NO LOGGING • DETERMINISTIC RULES         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (centavos)
//! - [`types`] - Product, statuses, payment methods, service rate
//! - [`error`] - Domain error types and their [`ErrorKind`]
//! - [`validation`] - Input validation
//! - [`catalog`] - Immutable menu snapshot
//! - [`cart`] - Pre-submission selection
//! - [`order`] - Submitted orders and the kitchen lifecycle
//! - [`tab`] - Table sessions
//! - [`billing`] - Bill computation and payment confirmation
//!
//! ## Example Usage
//!
//! ```rust
//! use comanda_core::{Cart, Catalog, Order, OrderItem, Product, Tab, ServiceRate};
//! use comanda_core::billing::compute_bill;
//!
//! let catalog = Catalog::new(vec![Product {
//!     id: 1,
//!     name: "Hambúrguer Clássico".to_string(),
//!     price_cents: 2490,
//!     category: "Pratos".to_string(),
//!     available: true,
//! }])
//! .unwrap();
//!
//! let mut tab = Tab::free(5);
//! tab.open(2).unwrap();
//!
//! let mut cart = Cart::new(5);
//! cart.add_or_increment(catalog.require(1).unwrap(), 2).unwrap();
//!
//! let items = OrderItem::snapshot_cart(&cart, &catalog).unwrap();
//! tab.attach_order(Order::new(1, 5, items, chrono::Utc::now())).unwrap();
//!
//! let bill = compute_bill(&tab, ServiceRate::default());
//! assert_eq!(bill.total.cents(), 5478); // 49.80 + 4.98
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod tab;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use billing::{Bill, Payment};
pub use cart::{Cart, CartLine};
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use order::{Order, OrderItem};
pub use tab::{ClosedTab, Tab};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in one cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single cart line.
///
/// Catches slips like typing 100 instead of 10.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Highest catalog price, in centavos (R$ 1,000,000.00).
///
/// A full cart at this price stays far inside `i64`, as does its service
/// charge.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Largest party that can be seated at one table.
pub const MAX_PARTY_SIZE: u32 = 50;

/// Customary 10% service charge, in basis points.
pub const DEFAULT_SERVICE_RATE_BPS: u32 = 1000;
