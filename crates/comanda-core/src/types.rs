//! # Domain Types
//!
//! Value types shared by the cart, order, tab and billing modules.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   TabStatus     │   │  OrderStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (u32)       │   │  Free           │   │  Pending        │       │
//! │  │  name           │   │  Occupied       │   │  InProgress     │       │
//! │  │  price_cents    │   └─────────────────┘   │  Ready          │       │
//! │  │  category       │                         │  Delivered      │       │
//! │  │  available      │   ┌─────────────────┐   │  Cancelled      │       │
//! │  └─────────────────┘   │ PaymentMethod   │   └─────────────────┘       │
//! │                        │  Cash/Card/Pix  │                              │
//! │  ┌─────────────────┐   └─────────────────┘                              │
//! │  │  ServiceRate    │                                                    │
//! │  │  1000 bps = 10% │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statuses are closed enums. Wire strings are parsed once at the boundary
//! (`FromStr`) and never compared as text inside the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Table number. Tables are numbered from 1.
pub type TableId = u32;

/// Catalog product identifier (≥ 1).
pub type ProductId = u32;

/// Order identifier assigned when the order is persisted.
pub type OrderId = u64;

// =============================================================================
// Service Rate
// =============================================================================

/// Service charge rate in basis points (bps).
///
/// 1 basis point = 0.01%, so the customary 10% service is 1000 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceRate(u32);

impl ServiceRate {
    /// The standard 10% service charge.
    pub const STANDARD: ServiceRate = ServiceRate(crate::DEFAULT_SERVICE_RATE_BPS);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        ServiceRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for ServiceRate {
    fn default() -> Self {
        ServiceRate::STANDARD
    }
}

// =============================================================================
// Product
// =============================================================================

/// A menu item offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (≥ 1).
    pub id: ProductId,

    /// Display name shown to the waiter and on the bill.
    pub name: String,

    /// Current price in centavos.
    pub price_cents: i64,

    /// Menu section ("Pratos", "Bebidas", ...).
    pub category: String,

    /// Whether the kitchen can currently serve it.
    pub available: bool,
}

impl Product {
    /// Returns the current price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Tab Status
// =============================================================================

/// Occupancy state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    /// Nobody seated, no orders.
    #[default]
    Free,
    /// Guests seated; orders may be placed.
    Occupied,
}

impl fmt::Display for TabStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabStatus::Free => write!(f, "free"),
            TabStatus::Occupied => write!(f, "occupied"),
        }
    }
}

impl FromStr for TabStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" | "available" => Ok(TabStatus::Free),
            "occupied" => Ok(TabStatus::Occupied),
            _ => Err(ValidationError::NotAllowed {
                field: "tab status".to_string(),
                allowed: vec!["free".to_string(), "occupied".to_string()],
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Kitchen lifecycle of a submitted order.
///
/// ## Transition Table
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Pending ──► InProgress ──► Ready ──► Delivered                        │
/// │     │            │            │                                         │
/// │     └────────────┴────────────┴──────► Cancelled (terminal)            │
/// │                                                                         │
/// │  Delivered is terminal too: it cannot be cancelled.                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting for the kitchen.
    #[default]
    Pending,
    /// Being prepared.
    InProgress,
    /// Plated, waiting for a runner.
    Ready,
    /// Served to the table.
    Delivered,
    /// Withdrawn before delivery; excluded from the bill.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true if `next` is a legal move from `self`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Ready)
                | (Ready, Delivered)
                | (Pending | InProgress | Ready, Cancelled)
        )
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether the order counts towards the bill.
    pub fn is_billable(self) -> bool {
        self != OrderStatus::Cancelled
    }

    /// Whether the kitchen still has work to do on the order.
    pub fn is_in_kitchen(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "order status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Notes and coins; the operator enters the amount handed over.
    Cash,
    /// Card on the external terminal, charged for the exact total.
    Card,
    /// Instant transfer, charged for the exact total.
    Pix,
}

impl PaymentMethod {
    /// Only cash needs the amount received to compute change.
    pub fn requires_amount_received(self) -> bool {
        self == PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Pix => write!(f, "pix"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "money" | "dinheiro" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            "pix" => Ok(PaymentMethod::Pix),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".to_string(), "card".to_string(), "pix".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_rate_default_is_ten_percent() {
        let rate = ServiceRate::default();
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_order_status_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivered));

        // No skipping, no going back
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn test_order_status_cancellation() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_order_status_parsing() {
        assert_eq!("PENDING".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("in-progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!(" ready ".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);
        assert!("completed".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_matches_as_str() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Debit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::Cash.requires_amount_received());
        assert!(!PaymentMethod::Pix.requires_amount_received());
    }

    #[test]
    fn test_tab_status_parsing() {
        assert_eq!("available".parse::<TabStatus>().unwrap(), TabStatus::Free);
        assert_eq!("Occupied".parse::<TabStatus>().unwrap(), TabStatus::Occupied);
        assert_eq!(TabStatus::default(), TabStatus::Free);
    }
}
