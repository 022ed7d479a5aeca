//! # Table Service
//!
//! The engine's front door: every waiter, kitchen and cashier action goes
//! through [`TableService`].
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. lock the table                (registry handle, per-table Mutex)    │
//! │  2. check the rule                (comanda-core check_*, no mutation)   │
//! │  3. call the collaborator         (CallPolicy::bounded, may time out)   │
//! │  4. apply the change              (comanda-core, synchronous)           │
//! │  5. release the lock, return a copy                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 4 runs only after step 3 returned `Ok`, with no `.await` between
//! them. A failed, timed-out or dropped call therefore leaves the tab
//! exactly as it was.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use comanda_core::billing::{self, compute_bill};
use comanda_core::validation::validate_table_id;
use comanda_core::{
    Bill, Cart, Catalog, ClosedTab, Money, Order, OrderId, OrderItem, OrderStatus, Payment,
    PaymentMethod, ProductId, ServiceRate, Tab, TableId,
};

use crate::config::EngineConfig;
use crate::data_source::DataSource;
use crate::error::{EngineError, EngineResult};
use crate::registry::TabRegistry;
use crate::retry::CallPolicy;

/// Logs a rejected operation and hands the error back.
fn rejected(operation: &'static str, table_id: TableId, err: impl Into<EngineError>) -> EngineError {
    let err = err.into();
    warn!(operation, table_id, kind = ?err.kind(), error = %err, "Rejected");
    err
}

/// Table-service engine.
#[derive(Debug)]
pub struct TableService {
    registry: TabRegistry,
    source: DataSource,
    catalog: RwLock<Arc<Catalog>>,
    policy: CallPolicy,
    service_rate: ServiceRate,
}

impl TableService {
    /// Validates the config, seeds the floor and loads the menu.
    ///
    /// ## Errors
    /// - `InvalidConfig` for a bad configuration
    /// - `Transport` if the catalog cannot be fetched after retries
    /// - `Core(Validation)` if the catalog contains malformed products
    pub async fn start(config: &EngineConfig, source: DataSource) -> EngineResult<Self> {
        config.validate()?;

        let policy = CallPolicy::from(&config.transport);
        let catalog = Self::fetch_catalog(&source, &policy).await?;

        info!(
            tables = config.floor.table_count,
            products = catalog.len(),
            service_rate_bps = config.billing.service_rate_bps,
            data_source = %source.mode(),
            "Table service started"
        );

        Ok(TableService {
            registry: TabRegistry::with_tables(config.floor.table_count),
            source,
            catalog: RwLock::new(Arc::new(catalog)),
            policy,
            service_rate: config.service_rate(),
        })
    }

    pub fn data_source(&self) -> &DataSource {
        &self.source
    }

    pub fn service_rate(&self) -> ServiceRate {
        self.service_rate
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    async fn fetch_catalog(source: &DataSource, policy: &CallPolicy) -> EngineResult<Catalog> {
        let products = policy
            .retried("list_products", || source.catalog().list_products())
            .await?;
        Ok(Catalog::new(products)?)
    }

    /// Current menu snapshot.
    pub async fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().await.clone()
    }

    /// Fetches the menu again and swaps the snapshot. On failure the old
    /// snapshot stays in place.
    pub async fn refresh_catalog(&self) -> EngineResult<Arc<Catalog>> {
        let fresh = Arc::new(Self::fetch_catalog(&self.source, &self.policy).await?);
        *self.catalog.write().await = fresh.clone();

        info!(products = fresh.len(), "Catalog refreshed");
        Ok(fresh)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product from the current menu to a cart.
    pub async fn add_to_cart(&self, cart: &mut Cart, product_id: ProductId, quantity: i64) -> EngineResult<()> {
        let catalog = self.catalog().await;
        let product = catalog.require(product_id)?;
        cart.add_or_increment(product, quantity)?;

        debug!(table_id = cart.table_id(), product_id, quantity, "Added to cart");
        Ok(())
    }

    /// Cart subtotal at the current menu prices.
    pub async fn cart_subtotal(&self, cart: &Cart) -> EngineResult<Money> {
        let catalog = self.catalog().await;
        Ok(cart.subtotal(&catalog)?)
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Seats a party.
    ///
    /// Unknown table ids are registered once the table backend accepted the
    /// open; a rejected open leaves the registry as it was.
    pub async fn open_table(&self, table_id: TableId, number_of_people: u32) -> EngineResult<Tab> {
        debug!(table_id, number_of_people, "open_table");
        validate_table_id(table_id).map_err(|e| rejected("open_table", table_id, e))?;

        let Ok(handle) = self.registry.get(table_id).await else {
            return self.open_unregistered(table_id, number_of_people).await;
        };

        let mut tab = handle.lock().await;
        self.seat(&mut tab, number_of_people).await?;

        info!(table_id, number_of_people, "Table opened");
        Ok(tab.clone())
    }

    async fn open_unregistered(&self, table_id: TableId, number_of_people: u32) -> EngineResult<Tab> {
        let mut tab = Tab::free(table_id);
        self.seat(&mut tab, number_of_people).await?;

        // Another caller may have registered the id while the backend call ran
        self.registry
            .insert_new(tab.clone())
            .await
            .map_err(|e| rejected("open_table", table_id, e))?;

        info!(table_id, number_of_people, "New table registered and opened");
        Ok(tab)
    }

    /// Check, backend call, then open, for a tab the caller holds.
    async fn seat(&self, tab: &mut Tab, number_of_people: u32) -> EngineResult<()> {
        let table_id = tab.id();
        tab.check_openable(number_of_people)
            .map_err(|e| rejected("open_table", table_id, e))?;

        self.policy
            .bounded(
                "open_table",
                self.source.tables().open_table(table_id, number_of_people),
            )
            .await
            .map_err(|e| rejected("open_table", table_id, e))?;

        tab.open(number_of_people)?;
        Ok(())
    }

    pub async fn get_tab(&self, table_id: TableId) -> EngineResult<Tab> {
        self.registry.snapshot(table_id).await
    }

    /// Every known table, ordered by id.
    pub async fn list_tabs(&self) -> Vec<Tab> {
        self.registry.list().await
    }

    /// Occupied tables, ordered by id.
    pub async fn list_occupied(&self) -> Vec<Tab> {
        self.registry.list_occupied().await
    }

    /// Frees a table and returns what was on it.
    ///
    /// ## Errors
    /// - `NotOccupied` if the table is free
    /// - `UnpaidBalance` if something is owed and no payment was confirmed
    /// - `Transport` if the table backend fails or times out
    pub async fn close_table(&self, table_id: TableId) -> EngineResult<ClosedTab> {
        debug!(table_id, "close_table");

        let handle = self.registry.get(table_id).await?;
        let mut tab = handle.lock().await;
        tab.check_closable(self.service_rate)
            .map_err(|e| rejected("close_table", table_id, e))?;

        self.policy
            .bounded("close_table", self.source.tables().close_table(table_id))
            .await
            .map_err(|e| rejected("close_table", table_id, e))?;

        let closed = tab.close(self.service_rate)?;
        info!(
            table_id,
            orders = closed.orders.len(),
            total = %closed.bill.total,
            "Table closed"
        );
        Ok(closed)
    }

    /// Rebuilds occupied tables from the table and order backends.
    ///
    /// Returns how many tables were restored.
    pub async fn restore_from_backend(&self) -> EngineResult<usize> {
        let tables = self
            .policy
            .retried("list_tables", || self.source.tables().list_tables())
            .await?;

        let mut restored = 0;
        for remote in tables.into_iter().filter(|t| t.is_occupied()) {
            let table_id = remote.id();
            let orders = self
                .policy
                .retried("list_orders", || self.source.orders().list_orders(table_id))
                .await?;

            let tab = Tab::restore(table_id, remote.number_of_people(), orders)?;
            debug!(table_id, orders = tab.orders().len(), "Restoring table");
            self.registry.restore(tab).await;
            restored += 1;
        }

        info!(restored, "Tables restored from backend");
        Ok(restored)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Sends a cart to the kitchen as a new PENDING order.
    ///
    /// Prices are frozen from the current menu. The cart is not touched;
    /// the caller clears it once this returns `Ok`.
    ///
    /// ## Errors
    /// - `Validation(EmptyCart)` for an empty cart
    /// - `TableNotOccupied` if nobody is seated
    /// - `TabSettled` if the table already paid
    /// - `Transport` if the order backend fails or times out
    pub async fn submit_order(&self, cart: &Cart) -> EngineResult<Order> {
        let table_id = cart.table_id();
        debug!(table_id, lines = cart.line_count(), "submit_order");

        let catalog = self.catalog().await;
        let items = OrderItem::snapshot_cart(cart, &catalog)
            .map_err(|e| rejected("submit_order", table_id, e))?;

        let handle = self.registry.get(table_id).await?;
        let mut tab = handle.lock().await;
        tab.check_accepts_orders()
            .map_err(|e| rejected("submit_order", table_id, e))?;

        let order = self
            .policy
            .bounded("create_order", self.source.orders().create_order(table_id, items))
            .await
            .map_err(|e| rejected("submit_order", table_id, e))?;

        tab.attach_order(order.clone())
            .map_err(|e| rejected("submit_order", table_id, e))?;
        info!(
            table_id,
            order_id = order.id(),
            items = order.item_count(),
            total = %order.total(),
            "Order submitted"
        );
        Ok(order)
    }

    /// Orders recorded for a table, as the order backend has them.
    pub async fn list_orders(&self, table_id: TableId) -> EngineResult<Vec<Order>> {
        Ok(self
            .policy
            .retried("list_orders", || self.source.orders().list_orders(table_id))
            .await?)
    }

    /// Moves an order along its lifecycle.
    pub async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> EngineResult<Order> {
        debug!(order_id, %status, "update_order_status");

        let table_id = self.find_order_table(order_id).await?;
        let handle = self.registry.get(table_id).await?;
        let mut tab = handle.lock().await;
        tab.check_status_change(order_id, status)
            .map_err(|e| rejected("update_order_status", table_id, e))?;

        self.policy
            .bounded(
                "update_order_status",
                self.source.orders().update_order_status(order_id, status),
            )
            .await
            .map_err(|e| rejected("update_order_status", table_id, e))?;

        let order = tab.set_order_status(order_id, status)?.clone();
        info!(table_id, order_id, %status, "Order status changed");
        Ok(order)
    }

    /// PENDING → IN_PROGRESS.
    pub async fn start_preparation(&self, order_id: OrderId) -> EngineResult<Order> {
        self.update_order_status(order_id, OrderStatus::InProgress).await
    }

    /// IN_PROGRESS → READY.
    pub async fn mark_ready(&self, order_id: OrderId) -> EngineResult<Order> {
        self.update_order_status(order_id, OrderStatus::Ready).await
    }

    /// READY → DELIVERED.
    pub async fn mark_delivered(&self, order_id: OrderId) -> EngineResult<Order> {
        self.update_order_status(order_id, OrderStatus::Delivered).await
    }

    /// Any non-delivered status → CANCELLED. Refused once the table paid.
    pub async fn cancel_order(&self, order_id: OrderId) -> EngineResult<Order> {
        self.update_order_status(order_id, OrderStatus::Cancelled).await
    }

    /// Orders the kitchen still has to work on, oldest first.
    pub async fn kitchen_queue(&self) -> Vec<Order> {
        let mut queue: Vec<Order> = Vec::new();
        for handle in self.registry.handles().await {
            let tab = handle.lock().await;
            queue.extend(tab.kitchen_orders().cloned());
        }
        queue.sort_by_key(|o| (o.created_at(), o.id()));
        queue
    }

    async fn find_order_table(&self, order_id: OrderId) -> EngineResult<TableId> {
        for handle in self.registry.handles().await {
            let tab = handle.lock().await;
            if tab.orders().iter().any(|o| o.id() == order_id) {
                return Ok(tab.id());
            }
        }
        warn!(order_id, "Order not found on any table");
        Err(EngineError::OrderNotFound(order_id))
    }

    // =========================================================================
    // Billing
    // =========================================================================

    /// Current bill for a table.
    pub async fn compute_bill(&self, table_id: TableId) -> EngineResult<Bill> {
        let tab = self.registry.snapshot(table_id).await?;
        Ok(compute_bill(&tab, self.service_rate))
    }

    /// Confirms payment of the table's current bill.
    ///
    /// ## Errors
    /// - `NotOccupied` if nobody is seated
    /// - `TabSettled` if already paid
    /// - `InsufficientPayment` if cash is missing or short
    pub async fn resolve_payment(
        &self,
        table_id: TableId,
        method: PaymentMethod,
        amount_received: Option<Money>,
    ) -> EngineResult<Payment> {
        debug!(table_id, %method, "resolve_payment");

        let handle = self.registry.get(table_id).await?;
        let mut tab = handle.lock().await;
        let payment = billing::resolve_payment(&mut tab, self.service_rate, method, amount_received)
            .map_err(|e| rejected("resolve_payment", table_id, e))?;

        info!(
            table_id,
            payment_id = %payment.id,
            %method,
            amount_due = %payment.amount_due,
            change = %payment.change,
            "Payment confirmed"
        );
        Ok(payment)
    }
}
