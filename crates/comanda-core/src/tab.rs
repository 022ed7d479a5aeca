//! # Tabs
//!
//! One table's occupancy session, from seating to the final close.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   FREE ──open(people)──► OCCUPIED ──attach_order──► OCCUPIED            │
//! │    ▲                        │                          │                │
//! │    │                        │ (total = 0)              │ record_payment │
//! │    │                        ▼                          ▼                │
//! │    └──────────close──── OCCUPIED ◄──────────── OCCUPIED [settled]       │
//! │                                                                         │
//! │   Rejected, never ignored:                                              │
//! │   - open on OCCUPIED              → AlreadyOccupied                     │
//! │   - attach_order on FREE          → TableNotOccupied                    │
//! │   - attach_order / cancel on paid → TabSettled                          │
//! │   - close on FREE                 → NotOccupied                         │
//! │   - close with total > 0, unpaid  → UnpaidBalance                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `check_*` method validates without mutating, so the engine can run
//! the check, call the backend, then apply the change in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::billing::{compute_bill, Bill, Payment};
use crate::error::{CoreError, CoreResult};
use crate::order::Order;
use crate::types::{OrderId, OrderStatus, ServiceRate, TabStatus, TableId};
use crate::validation::validate_party_size;

/// A table's session.
///
/// ## Invariants
/// - FREE: no orders, zero people, no payment
/// - OCCUPIED: 1..=MAX_PARTY_SIZE people
/// - Orders are kept in submission order and all carry this tab's id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tab {
    id: TableId,
    status: TabStatus,
    number_of_people: u32,
    orders: Vec<Order>,
    payment: Option<Payment>,
}

/// What a close hands over for archiving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosedTab {
    pub table_id: TableId,
    pub number_of_people: u32,
    pub orders: Vec<Order>,
    pub bill: Bill,
    pub payment: Option<Payment>,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
}

impl Tab {
    /// An empty table.
    pub fn free(id: TableId) -> Self {
        Tab {
            id,
            status: TabStatus::Free,
            number_of_people: 0,
            orders: Vec::new(),
            payment: None,
        }
    }

    /// Rebuilds an occupied tab from backend records (startup recovery).
    ///
    /// ## Errors
    /// - `Validation` if the party size is out of range
    /// - `OrderTableMismatch` if an order belongs to another table
    pub fn restore(id: TableId, number_of_people: u32, orders: Vec<Order>) -> CoreResult<Self> {
        validate_party_size(number_of_people)?;

        if let Some(stray) = orders.iter().find(|o| o.tab_id() != id) {
            return Err(CoreError::OrderTableMismatch {
                order_id: stray.id(),
                expected: id,
                actual: stray.tab_id(),
            });
        }

        let mut orders = orders;
        orders.sort_by_key(|o| (o.created_at(), o.id()));

        Ok(Tab {
            id,
            status: TabStatus::Occupied,
            number_of_people,
            orders,
            payment: None,
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn status(&self) -> TabStatus {
        self.status
    }

    pub fn number_of_people(&self) -> u32 {
        self.number_of_people
    }

    /// Orders in submission order, cancelled ones included.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.status == TabStatus::Occupied
    }

    /// Occupied with a confirmed payment, waiting to be closed.
    pub fn is_settled(&self) -> bool {
        self.payment.is_some()
    }

    /// Orders the kitchen still has to work on.
    pub fn kitchen_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status().is_in_kitchen())
    }

    // -------------------------------------------------------------------------
    // Open
    // -------------------------------------------------------------------------

    pub fn check_openable(&self, number_of_people: u32) -> CoreResult<()> {
        validate_party_size(number_of_people)?;

        if self.is_occupied() {
            return Err(CoreError::AlreadyOccupied(self.id));
        }

        Ok(())
    }

    /// Seats a party at a free table.
    pub fn open(&mut self, number_of_people: u32) -> CoreResult<()> {
        self.check_openable(number_of_people)?;

        self.status = TabStatus::Occupied;
        self.number_of_people = number_of_people;
        self.orders.clear();
        self.payment = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Whether a new order may be placed right now.
    pub fn check_accepts_orders(&self) -> CoreResult<()> {
        if !self.is_occupied() {
            return Err(CoreError::TableNotOccupied(self.id));
        }

        if self.is_settled() {
            return Err(CoreError::TabSettled(self.id));
        }

        Ok(())
    }

    /// Appends a submitted order.
    pub fn attach_order(&mut self, order: Order) -> CoreResult<()> {
        self.check_accepts_orders()?;

        if order.tab_id() != self.id {
            return Err(CoreError::OrderTableMismatch {
                order_id: order.id(),
                expected: self.id,
                actual: order.tab_id(),
            });
        }

        self.orders.push(order);
        Ok(())
    }

    pub fn order(&self, order_id: OrderId) -> CoreResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id() == order_id)
            .ok_or(CoreError::OrderNotFound {
                table_id: self.id,
                order_id,
            })
    }

    /// Validates a status move for one of this tab's orders.
    ///
    /// Cancelling is refused once paid, since it would change the bill the
    /// payment covered.
    pub fn check_status_change(&self, order_id: OrderId, next: OrderStatus) -> CoreResult<()> {
        let order = self.order(order_id)?;

        if next == OrderStatus::Cancelled && self.is_settled() {
            return Err(CoreError::TabSettled(self.id));
        }

        order.check_transition(next)
    }

    /// Applies a status move and returns the updated order.
    pub fn set_order_status(&mut self, order_id: OrderId, next: OrderStatus) -> CoreResult<&Order> {
        self.check_status_change(order_id, next)?;

        let table_id = self.id;
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(CoreError::OrderNotFound { table_id, order_id })?;
        order.transition_to(next)?;
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Payment
    // -------------------------------------------------------------------------

    /// Whether a payment may be confirmed right now.
    pub fn check_payable(&self) -> CoreResult<()> {
        if !self.is_occupied() {
            return Err(CoreError::NotOccupied(self.id));
        }

        if self.is_settled() {
            return Err(CoreError::TabSettled(self.id));
        }

        Ok(())
    }

    /// Stores a confirmed payment. Use [`crate::billing::resolve_payment`]
    /// to compute and confirm in one go.
    pub fn record_payment(&mut self, payment: Payment) -> CoreResult<()> {
        self.check_payable()?;
        self.payment = Some(payment);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Close
    // -------------------------------------------------------------------------

    /// Validates a close and returns the final bill.
    pub fn check_closable(&self, rate: ServiceRate) -> CoreResult<Bill> {
        if !self.is_occupied() {
            return Err(CoreError::NotOccupied(self.id));
        }

        let bill = compute_bill(self, rate);
        if bill.total.is_positive() && !self.is_settled() {
            return Err(CoreError::UnpaidBalance {
                table_id: self.id,
                total: bill.total,
            });
        }

        Ok(bill)
    }

    /// Frees the table and returns what was on it.
    pub fn close(&mut self, rate: ServiceRate) -> CoreResult<ClosedTab> {
        let bill = self.check_closable(rate)?;

        let closed = ClosedTab {
            table_id: self.id,
            number_of_people: self.number_of_people,
            orders: std::mem::take(&mut self.orders),
            bill,
            payment: self.payment.take(),
            closed_at: Utc::now(),
        };

        self.status = TabStatus::Free;
        self.number_of_people = 0;
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::resolve_payment;
    use crate::error::ValidationError;
    use crate::order::OrderItem;
    use crate::types::PaymentMethod;

    fn order(id: OrderId, tab_id: TableId, unit_price_cents: i64) -> Order {
        Order::new(
            id,
            tab_id,
            vec![OrderItem {
                product_id: 1,
                name_snapshot: "Hambúrguer Clássico".to_string(),
                unit_price_cents,
                quantity: 1,
            }],
            Utc::now(),
        )
    }

    fn occupied(id: TableId) -> Tab {
        let mut tab = Tab::free(id);
        tab.open(2).unwrap();
        tab
    }

    #[test]
    fn test_open_free_table() {
        let tab = occupied(5);
        assert_eq!(tab.status(), TabStatus::Occupied);
        assert_eq!(tab.number_of_people(), 2);
        assert!(tab.orders().is_empty());
    }

    #[test]
    fn test_open_twice_rejected() {
        let mut tab = occupied(5);
        let err = tab.open(4).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyOccupied(5)));
        assert_eq!(tab.number_of_people(), 2);
    }

    #[test]
    fn test_open_validates_party_size() {
        let mut tab = Tab::free(1);
        assert!(matches!(
            tab.open(0),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(tab.open(51).is_err());
        assert_eq!(tab, Tab::free(1));
    }

    #[test]
    fn test_attach_requires_occupied() {
        let mut tab = Tab::free(5);
        let err = tab.attach_order(order(1, 5, 100)).unwrap_err();
        assert!(matches!(err, CoreError::TableNotOccupied(5)));
    }

    #[test]
    fn test_attach_rejects_other_table() {
        let mut tab = occupied(5);
        let err = tab.attach_order(order(1, 6, 100)).unwrap_err();
        assert!(matches!(err, CoreError::OrderTableMismatch { expected: 5, actual: 6, .. }));
        assert!(tab.orders().is_empty());
    }

    #[test]
    fn test_orders_keep_submission_order() {
        let mut tab = occupied(5);
        for id in [3, 1, 2] {
            tab.attach_order(order(id, 5, 100)).unwrap();
        }
        let ids: Vec<_> = tab.orders().iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_set_order_status() {
        let mut tab = occupied(5);
        tab.attach_order(order(1, 5, 100)).unwrap();

        let updated = tab.set_order_status(1, OrderStatus::InProgress).unwrap();
        assert_eq!(updated.status(), OrderStatus::InProgress);
        assert_eq!(tab.kitchen_orders().count(), 1);

        tab.set_order_status(1, OrderStatus::Ready).unwrap();
        assert_eq!(tab.kitchen_orders().count(), 0);

        assert!(matches!(
            tab.set_order_status(99, OrderStatus::Ready),
            Err(CoreError::OrderNotFound { order_id: 99, .. })
        ));
    }

    #[test]
    fn test_close_unpaid_rejected() {
        let mut tab = occupied(5);
        tab.attach_order(order(1, 5, 5580)).unwrap();

        let err = tab.close(ServiceRate::STANDARD).unwrap_err();
        assert!(matches!(err, CoreError::UnpaidBalance { table_id: 5, total } if total.cents() == 6138));
        assert!(tab.is_occupied());
        assert_eq!(tab.orders().len(), 1);
    }

    #[test]
    fn test_close_after_payment_resets() {
        let mut tab = occupied(5);
        tab.attach_order(order(1, 5, 5580)).unwrap();
        resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Card, None).unwrap();

        let closed = tab.close(ServiceRate::STANDARD).unwrap();

        assert_eq!(closed.table_id, 5);
        assert_eq!(closed.orders.len(), 1);
        assert_eq!(closed.bill.total.cents(), 6138);
        assert!(closed.payment.is_some());
        assert_eq!(tab, Tab::free(5));
    }

    #[test]
    fn test_close_zero_total_without_payment() {
        let mut tab = occupied(5);
        tab.attach_order(order(1, 5, 2490)).unwrap();
        tab.set_order_status(1, OrderStatus::Cancelled).unwrap();

        let closed = tab.close(ServiceRate::STANDARD).unwrap();
        assert!(closed.bill.is_zero());
        assert!(closed.payment.is_none());
        assert_eq!(tab.status(), TabStatus::Free);
    }

    #[test]
    fn test_close_free_table_rejected() {
        let mut tab = Tab::free(2);
        assert!(matches!(tab.close(ServiceRate::STANDARD), Err(CoreError::NotOccupied(2))));
    }

    #[test]
    fn test_settled_tab_rejects_new_orders_and_cancels() {
        let mut tab = occupied(5);
        tab.attach_order(order(1, 5, 1000)).unwrap();
        resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Pix, None).unwrap();

        assert!(matches!(tab.attach_order(order(2, 5, 100)), Err(CoreError::TabSettled(5))));
        assert!(matches!(
            tab.set_order_status(1, OrderStatus::Cancelled),
            Err(CoreError::TabSettled(5))
        ));

        // The kitchen can still finish what was paid for
        tab.set_order_status(1, OrderStatus::InProgress).unwrap();
    }

    #[test]
    fn test_restore() {
        let early = order(1, 4, 100);
        let late = Order::new(
            2,
            4,
            early.items().to_vec(),
            early.created_at() + chrono::Duration::seconds(5),
        );
        let tab = Tab::restore(4, 3, vec![late, early]).unwrap();

        assert!(tab.is_occupied());
        let ids: Vec<_> = tab.orders().iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![1, 2]);

        assert!(matches!(
            Tab::restore(4, 3, vec![order(9, 7, 100)]),
            Err(CoreError::OrderTableMismatch { order_id: 9, .. })
        ));
    }
}
