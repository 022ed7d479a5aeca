//! # Fixture Backend
//!
//! In-memory implementation of every collaborator port, used by the demo
//! binary and the tests.
//!
//! ## Fault Injection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  call ──► count call ──► sleep(latency) ──► fail_next > 0 ? ──► error   │
//! │                                                  │                      │
//! │                                                  └── no ──► apply       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is only touched after the latency has elapsed, so a caller
//! that gives up early leaves the fixture as it was.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use comanda_core::{Order, OrderId, OrderItem, OrderStatus, Product, Tab, TableId};

use crate::error::{TransportError, TransportResult};
use crate::ports::{CatalogProvider, OrderGateway, TableGateway};

/// The demo menu.
pub fn fixture_menu() -> Vec<Product> {
    let product = |id, name: &str, price_cents, category: &str, available| Product {
        id,
        name: name.to_string(),
        price_cents,
        category: category.to_string(),
        available,
    };

    vec![
        product(1, "Hambúrguer Clássico", 2490, "Hambúrgueres", true),
        product(2, "Coca-Cola Zero", 600, "Bebidas", true),
        product(3, "Batata Frita", 1890, "Porções", true),
        product(4, "Suco de Laranja", 900, "Bebidas", true),
        product(5, "Picanha na Chapa", 8900, "Pratos", false),
    ]
}

#[derive(Debug, Default)]
struct FixtureState {
    products: Vec<Product>,
    orders: BTreeMap<OrderId, Order>,
    /// Occupied tables and their party size.
    tables: BTreeMap<TableId, u32>,
    archived: Vec<Order>,
    next_order_id: OrderId,
    latency: Duration,
    fail_next: u32,
    calls: u64,
}

/// In-memory backend.
#[derive(Debug)]
pub struct FixtureBackend {
    state: Mutex<FixtureState>,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::with_menu(fixture_menu())
    }
}

impl FixtureBackend {
    /// Backend serving the demo menu.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(products: Vec<Product>) -> Self {
        FixtureBackend {
            state: Mutex::new(FixtureState {
                products,
                next_order_id: 1,
                ..Default::default()
            }),
        }
    }

    // =========================================================================
    // Fault Injection
    // =========================================================================

    /// Delay applied to every subsequent call.
    pub async fn set_latency(&self, latency: Duration) {
        self.state.lock().await.latency = latency;
    }

    /// The next `count` calls fail with a backend error.
    pub async fn fail_next(&self, count: u32) {
        self.state.lock().await.fail_next = count;
    }

    /// Total calls received, failed ones included.
    pub async fn calls(&self) -> u64 {
        self.state.lock().await.calls
    }

    // =========================================================================
    // Menu Management
    // =========================================================================

    /// Changes a product's price for the next catalog fetch.
    pub async fn set_price(&self, product_id: comanda_core::ProductId, price_cents: i64) {
        let mut state = self.state.lock().await;
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.price_cents = price_cents;
        }
    }

    pub async fn set_available(&self, product_id: comanda_core::ProductId, available: bool) {
        let mut state = self.state.lock().await;
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.available = available;
        }
    }

    /// Orders of closed tables.
    pub async fn archived_orders(&self) -> Vec<Order> {
        self.state.lock().await.archived.clone()
    }

    /// Counts the call, waits out the latency, then consumes an injected
    /// failure if one is pending.
    async fn enter(&self, operation: &'static str) -> TransportResult<()> {
        let latency = {
            let mut state = self.state.lock().await;
            state.calls += 1;
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().await;
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(TransportError::backend(operation, "injected failure"));
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for FixtureBackend {
    async fn list_products(&self) -> TransportResult<Vec<Product>> {
        self.enter("list_products")
            .await
            .map_err(|e| TransportError::CatalogUnavailable(e.to_string()))?;

        Ok(self.state.lock().await.products.clone())
    }
}

#[async_trait]
impl OrderGateway for FixtureBackend {
    async fn create_order(&self, tab_id: TableId, items: Vec<OrderItem>) -> TransportResult<Order> {
        self.enter("create_order").await?;

        let mut state = self.state.lock().await;
        if !state.tables.contains_key(&tab_id) {
            return Err(TransportError::backend(
                "create_order",
                format!("table {} is not open", tab_id),
            ));
        }

        let id = state.next_order_id;
        state.next_order_id += 1;

        let order = Order::new(id, tab_id, items, Utc::now());
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn list_orders(&self, tab_id: TableId) -> TransportResult<Vec<Order>> {
        self.enter("list_orders").await?;

        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .filter(|o| o.tab_id() == tab_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> TransportResult<Order> {
        self.enter("update_order_status").await?;

        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&order_id).ok_or_else(|| {
            TransportError::backend("update_order_status", format!("order {} not found", order_id))
        })?;

        order
            .transition_to(status)
            .map_err(|e| TransportError::backend("update_order_status", e.to_string()))?;
        Ok(order.clone())
    }
}

#[async_trait]
impl TableGateway for FixtureBackend {
    async fn open_table(&self, table_id: TableId, number_of_people: u32) -> TransportResult<Tab> {
        self.enter("open_table").await?;

        let mut state = self.state.lock().await;
        if state.tables.contains_key(&table_id) {
            return Err(TransportError::backend(
                "open_table",
                format!("table {} is already open", table_id),
            ));
        }

        let mut tab = Tab::free(table_id);
        tab.open(number_of_people)
            .map_err(|e| TransportError::backend("open_table", e.to_string()))?;
        state.tables.insert(table_id, number_of_people);
        Ok(tab)
    }

    async fn get_table(&self, table_id: TableId) -> TransportResult<Tab> {
        self.enter("get_table").await?;

        let state = self.state.lock().await;
        state.rebuild_tab(table_id)
    }

    async fn list_tables(&self) -> TransportResult<Vec<Tab>> {
        self.enter("list_tables").await?;

        let state = self.state.lock().await;
        state
            .tables
            .keys()
            .map(|&table_id| state.rebuild_tab(table_id))
            .collect()
    }

    async fn close_table(&self, table_id: TableId) -> TransportResult<()> {
        self.enter("close_table").await?;

        let mut state = self.state.lock().await;
        if state.tables.remove(&table_id).is_none() {
            return Err(TransportError::backend(
                "close_table",
                format!("table {} is not open", table_id),
            ));
        }

        let closed: Vec<OrderId> = state
            .orders
            .values()
            .filter(|o| o.tab_id() == table_id)
            .map(|o| o.id())
            .collect();
        for id in closed {
            if let Some(order) = state.orders.remove(&id) {
                state.archived.push(order);
            }
        }

        Ok(())
    }
}

impl FixtureState {
    fn rebuild_tab(&self, table_id: TableId) -> TransportResult<Tab> {
        match self.tables.get(&table_id) {
            Some(&people) => {
                let orders = self
                    .orders
                    .values()
                    .filter(|o| o.tab_id() == table_id)
                    .cloned()
                    .collect();
                Tab::restore(table_id, people, orders)
                    .map_err(|e| TransportError::backend("get_table", e.to_string()))
            }
            None => Ok(Tab::free(table_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger(quantity: u32) -> OrderItem {
        OrderItem {
            product_id: 1,
            name_snapshot: "Hambúrguer Clássico".to_string(),
            unit_price_cents: 2490,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_fixture_menu() {
        let backend = FixtureBackend::new();
        let products = backend.list_products().await.unwrap();

        assert_eq!(products.len(), 5);
        assert_eq!(products[0].name, "Hambúrguer Clássico");
        assert_eq!(products[0].price_cents, 2490);
        assert!(products.iter().any(|p| !p.available));
    }

    #[tokio::test]
    async fn test_order_ids_increase() {
        let backend = FixtureBackend::new();
        backend.open_table(5, 2).await.unwrap();

        let first = backend.create_order(5, vec![burger(1)]).await.unwrap();
        let second = backend.create_order(5, vec![burger(2)]).await.unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(second.status(), OrderStatus::Pending);
        assert_eq!(backend.list_orders(5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_order_requires_open_table() {
        let backend = FixtureBackend::new();
        let err = backend.create_order(3, vec![burger(1)]).await.unwrap_err();
        assert!(matches!(err, TransportError::Backend { operation: "create_order", .. }));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let backend = FixtureBackend::new();
        backend.fail_next(2).await;

        assert!(matches!(
            backend.list_products().await,
            Err(TransportError::CatalogUnavailable(_))
        ));
        assert!(backend.list_tables().await.is_err());
        assert!(backend.list_tables().await.is_ok());
        assert_eq!(backend.calls().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let backend = FixtureBackend::new();
        backend.set_latency(Duration::from_millis(300)).await;

        let started = tokio::time::Instant::now();
        backend.list_products().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_close_archives_orders() {
        let backend = FixtureBackend::new();
        backend.open_table(5, 2).await.unwrap();
        backend.create_order(5, vec![burger(1)]).await.unwrap();

        assert_eq!(backend.get_table(5).await.unwrap().orders().len(), 1);

        backend.close_table(5).await.unwrap();

        assert!(backend.list_orders(5).await.unwrap().is_empty());
        assert_eq!(backend.archived_orders().await.len(), 1);
        assert!(!backend.get_table(5).await.unwrap().is_occupied());
        assert!(backend.close_table(5).await.is_err());
    }

    #[tokio::test]
    async fn test_set_price() {
        let backend = FixtureBackend::new();
        backend.set_price(1, 2990).await;
        backend.set_available(5, true).await;

        let products = backend.list_products().await.unwrap();
        assert_eq!(products[0].price_cents, 2990);
        assert!(products.iter().all(|p| p.available));
    }
}
