//! # Collaborator Ports
//!
//! The three external systems the engine depends on, as async traits.
//!
//! ```text
//!               ┌────────────────────────────┐
//!               │        TableService        │
//!               └──────┬──────────┬──────────┘
//!                      │          │          │
//!          ┌───────────┘          │          └───────────┐
//!          ▼                      ▼                      ▼
//!   CatalogProvider         OrderGateway           TableGateway
//!   list_products           create_order           open_table
//!                           list_orders            get_table
//!                           update_order_status    list_tables
//!                                                  close_table
//!          │                      │                      │
//!          └──────────┬───────────┴──────────┬───────────┘
//!                     ▼                      ▼
//!              HTTP backend (live)    FixtureBackend (in memory)
//! ```
//!
//! Implementations only move data. Every business rule is checked by the
//! engine before a call is made, and state changes are applied only after
//! the call returns `Ok`.

use async_trait::async_trait;

use comanda_core::{Order, OrderId, OrderItem, OrderStatus, Product, Tab, TableId};

use crate::error::TransportResult;

/// Source of the menu.
#[async_trait]
pub trait CatalogProvider: Send + Sync + std::fmt::Debug {
    /// Full product list, unavailable items included.
    async fn list_products(&self) -> TransportResult<Vec<Product>>;
}

/// Persistence for orders.
#[async_trait]
pub trait OrderGateway: Send + Sync + std::fmt::Debug {
    /// Stores a new PENDING order and returns it with its assigned id.
    async fn create_order(&self, tab_id: TableId, items: Vec<OrderItem>) -> TransportResult<Order>;

    /// Orders recorded for a table, any status.
    async fn list_orders(&self, tab_id: TableId) -> TransportResult<Vec<Order>>;

    /// Persists a status change and returns the stored order.
    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> TransportResult<Order>;
}

/// Persistence for table occupancy.
#[async_trait]
pub trait TableGateway: Send + Sync + std::fmt::Debug {
    async fn open_table(&self, table_id: TableId, number_of_people: u32) -> TransportResult<Tab>;

    async fn get_table(&self, table_id: TableId) -> TransportResult<Tab>;

    async fn list_tables(&self) -> TransportResult<Vec<Tab>>;

    async fn close_table(&self, table_id: TableId) -> TransportResult<()>;
}
