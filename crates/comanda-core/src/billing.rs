//! # Billing
//!
//! Turns a tab's orders into a payable bill and confirms payment against it.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Table 5                                                                │
//! │  ───────                                                                │
//! │  Order #1  2× Hambúrguer Clássico  24.90   → 49.80                      │
//! │            1× Coca-Cola Zero        6.00   →  6.00                      │
//! │  Order #2  1× Suco de Laranja       9.00   → (cancelled, skipped)       │
//! │                                              ─────                      │
//! │  subtotal                                    55.80                      │
//! │  service (1000 bps, half-up)                  5.58                      │
//! │  total                                       61.38                      │
//! │                                                                         │
//! │  Cash 70.00 → change 8.62                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bill is derived on demand and never stored. Only the confirmed
//! [`Payment`] is kept on the tab.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tab::Tab;
use crate::types::{PaymentMethod, ServiceRate};

// =============================================================================
// Bill
// =============================================================================

/// Payable summary of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bill {
    pub subtotal: Money,
    pub service_charge: Money,
    pub total: Money,
    pub service_rate: ServiceRate,
}

impl Bill {
    /// Applies the service rate to a subtotal.
    pub fn from_subtotal(subtotal: Money, service_rate: ServiceRate) -> Self {
        let service_charge = subtotal.apply_rate(service_rate);
        Bill {
            subtotal,
            service_charge,
            total: subtotal + service_charge,
            service_rate,
        }
    }

    /// Nothing to pay (no orders, or all cancelled).
    pub fn is_zero(&self) -> bool {
        self.total.is_zero()
    }
}

/// Computes the bill for a tab: every non-cancelled order at its frozen
/// prices, plus service. Same tab and rate always give the same bill.
pub fn compute_bill(tab: &Tab, rate: ServiceRate) -> Bill {
    let subtotal = tab.orders().iter().map(|o| o.billable_total()).sum();
    Bill::from_subtotal(subtotal, rate)
}

// =============================================================================
// Payment
// =============================================================================

/// A confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    /// UUID v4 as string.
    pub id: String,

    pub method: PaymentMethod,

    /// Bill total at confirmation time.
    pub amount_due: Money,

    /// Cash handed over. `None` for card and pix.
    pub amount_received: Option<Money>,

    /// Change returned. Always zero for card and pix.
    pub change: Money,

    #[ts(as = "String")]
    pub confirmed_at: DateTime<Utc>,
}

/// Confirms payment of a bill.
///
/// ## Rules
/// - Cash: `received` must be present and ≥ total; change = received − total
/// - Card / Pix: charged for the exact total, `received` is ignored
///
/// ## Errors
/// `InsufficientPayment` when cash is missing or short.
pub fn settle(bill: &Bill, method: PaymentMethod, received: Option<Money>) -> CoreResult<Payment> {
    let (amount_received, change) = if method.requires_amount_received() {
        let received = received.unwrap_or_default();
        if received < bill.total {
            return Err(CoreError::InsufficientPayment {
                total: bill.total,
                received,
            });
        }
        (Some(received), received - bill.total)
    } else {
        (None, Money::zero())
    };

    Ok(Payment {
        id: Uuid::new_v4().to_string(),
        method,
        amount_due: bill.total,
        amount_received,
        change,
        confirmed_at: Utc::now(),
    })
}

/// Computes the bill, confirms payment and records it on the tab.
///
/// ## Errors
/// - `NotOccupied` if nobody is seated
/// - `TabSettled` if a payment was already confirmed
/// - `InsufficientPayment` if cash does not cover the total
///
/// The tab is unchanged on error.
pub fn resolve_payment(
    tab: &mut Tab,
    rate: ServiceRate,
    method: PaymentMethod,
    received: Option<Money>,
) -> CoreResult<Payment> {
    tab.check_payable()?;

    let bill = compute_bill(tab, rate);
    let payment = settle(&bill, method, received)?;
    tab.record_payment(payment.clone())?;
    Ok(payment)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::catalog::Catalog;
    use crate::order::{Order, OrderItem};
    use crate::types::Product;

    fn menu() -> Catalog {
        Catalog::new(vec![
            Product {
                id: 1,
                name: "Hambúrguer Clássico".to_string(),
                price_cents: 2490,
                category: "Pratos".to_string(),
                available: true,
            },
            Product {
                id: 2,
                name: "Coca-Cola Zero".to_string(),
                price_cents: 600,
                category: "Bebidas".to_string(),
                available: true,
            },
        ])
        .unwrap()
    }

    /// Table 5 for two, 2 burgers and 1 coke submitted.
    fn table_five() -> Tab {
        let catalog = menu();
        let mut cart = Cart::new(5);
        cart.add_or_increment(catalog.require(1).unwrap(), 2).unwrap();
        cart.add_or_increment(catalog.require(2).unwrap(), 1).unwrap();

        let mut tab = Tab::free(5);
        tab.open(2).unwrap();
        let items = OrderItem::snapshot_cart(&cart, &catalog).unwrap();
        tab.attach_order(Order::new(1, 5, items, Utc::now())).unwrap();
        tab
    }

    #[test]
    fn test_compute_bill_scenario() {
        let bill = compute_bill(&table_five(), ServiceRate::STANDARD);

        assert_eq!(bill.subtotal.cents(), 5580);
        assert_eq!(bill.service_charge.cents(), 558);
        assert_eq!(bill.total.cents(), 6138);
    }

    #[test]
    fn test_compute_bill_is_idempotent() {
        let tab = table_five();
        let first = compute_bill(&tab, ServiceRate::STANDARD);
        let second = compute_bill(&tab, ServiceRate::STANDARD);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_rate() {
        let bill = compute_bill(&table_five(), ServiceRate::from_bps(0));
        assert_eq!(bill.total.cents(), 5580);

        let bill = compute_bill(&table_five(), ServiceRate::from_bps(1250));
        // 5580 × 12.5% = 697.5 → 698
        assert_eq!(bill.service_charge.cents(), 698);
    }

    #[test]
    fn test_cancelled_order_excluded() {
        let mut tab = table_five();
        let extra = OrderItem {
            product_id: 1,
            name_snapshot: "Hambúrguer Clássico".to_string(),
            unit_price_cents: 2490,
            quantity: 1,
        };
        tab.attach_order(Order::new(2, 5, vec![extra], Utc::now())).unwrap();
        assert_eq!(compute_bill(&tab, ServiceRate::STANDARD).subtotal.cents(), 8070);

        tab.set_order_status(2, crate::types::OrderStatus::Cancelled).unwrap();
        assert_eq!(compute_bill(&tab, ServiceRate::STANDARD).subtotal.cents(), 5580);
    }

    #[test]
    fn test_cash_with_change() {
        let mut tab = table_five();

        let payment = resolve_payment(
            &mut tab,
            ServiceRate::STANDARD,
            PaymentMethod::Cash,
            Some(Money::from_cents(7000)),
        )
        .unwrap();

        assert_eq!(payment.amount_due.cents(), 6138);
        assert_eq!(payment.change.cents(), 862);
        assert_eq!(payment.amount_received, Some(Money::from_cents(7000)));
        assert!(Uuid::parse_str(&payment.id).is_ok());
        assert_eq!(tab.payment(), Some(&payment));
    }

    #[test]
    fn test_cash_insufficient_leaves_tab_unpaid() {
        let mut tab = table_five();

        let err = resolve_payment(
            &mut tab,
            ServiceRate::STANDARD,
            PaymentMethod::Cash,
            Some(Money::from_cents(5000)),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
        assert!(!tab.is_settled());

        let err = resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Cash, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
    }

    #[test]
    fn test_exact_cash_has_no_change() {
        let bill = compute_bill(&table_five(), ServiceRate::STANDARD);
        let payment = settle(&bill, PaymentMethod::Cash, Some(Money::from_cents(6138))).unwrap();
        assert!(payment.change.is_zero());
    }

    #[test]
    fn test_card_and_pix_ignore_received() {
        let bill = compute_bill(&table_five(), ServiceRate::STANDARD);

        for method in [PaymentMethod::Card, PaymentMethod::Pix] {
            let payment = settle(&bill, method, Some(Money::from_cents(1))).unwrap();
            assert_eq!(payment.amount_received, None);
            assert!(payment.change.is_zero());
            assert_eq!(payment.amount_due.cents(), 6138);
        }
    }

    #[test]
    fn test_second_payment_rejected() {
        let mut tab = table_five();
        resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Pix, None).unwrap();

        let err = resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Card, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::TabSettled(5)));
    }

    #[test]
    fn test_payment_on_free_table_rejected() {
        let mut tab = Tab::free(3);
        let err = resolve_payment(&mut tab, ServiceRate::STANDARD, PaymentMethod::Pix, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotOccupied(3)));
    }
}
