//! # Error Types
//!
//! Domain-specific error types for comanda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comanda-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  comanda-engine errors (separate crate)                                │
//! │  ├── TransportError   - Collaborator calls failing or timing out       │
//! │  └── EngineError      - What callers of the engine see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery Categories
//! Every error maps to an [`ErrorKind`]. Only transport failures are worth
//! retrying; a state conflict retried as-is fails the same way again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;
use crate::types::{OrderId, OrderStatus, ProductId, TableId};

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input; fix the request.
    Validation,
    /// The tab or order is in the wrong state for the operation.
    StateConflict,
    /// The referenced table, order or product does not exist.
    NotFound,
    /// The payment does not cover the bill.
    Payment,
    /// A collaborator call failed or timed out.
    Transport,
    /// The engine is misconfigured.
    Configuration,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the tab, cart, order and billing rules.
///
/// Every variant is raised before any state is touched, so a caller that
/// receives one can assume the cart, tab and orders are unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Product exists but the kitchen cannot serve it right now.
    #[error("Product {product_id} ({name}) is not available")]
    ProductUnavailable { product_id: ProductId, name: String },

    /// Cart has reached its maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A line quantity would exceed the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u64, max: u32 },

    /// `open` on a table that already has guests.
    #[error("Table {0} is already occupied")]
    AlreadyOccupied(TableId),

    /// Order submitted against a table nobody is seated at.
    #[error("Table {0} is not occupied, cannot accept orders")]
    TableNotOccupied(TableId),

    /// `close` on a table that is already free.
    #[error("Table {0} is not occupied, nothing to close")]
    NotOccupied(TableId),

    /// `close` while the bill is still owed.
    ///
    /// ## User Workflow
    /// ```text
    /// Close table 5
    ///      │
    ///      ▼
    /// Bill total R$ 61.38, no confirmed payment
    ///      │
    ///      ▼
    /// UnpaidBalance { table_id: 5, total: R$ 61.38 }
    ///      │
    ///      ▼
    /// UI sends the operator to the payment screen
    /// ```
    #[error("Table {table_id} has an unpaid balance of {total}")]
    UnpaidBalance { table_id: TableId, total: Money },

    /// Order status move not allowed by the lifecycle.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The tab has a confirmed payment; only closing is allowed.
    #[error("Table {0} is already paid and can only be closed")]
    TabSettled(TableId),

    /// Cash handed over does not cover the total.
    #[error("Insufficient payment: total {total}, received {received}")]
    InsufficientPayment { total: Money, received: Money },

    /// Order id does not belong to the tab.
    #[error("Order {order_id} not found on table {table_id}")]
    OrderNotFound { table_id: TableId, order_id: OrderId },

    /// An order built for one table was handed to another.
    #[error("Order {order_id} belongs to table {actual}, not table {expected}")]
    OrderTableMismatch {
        order_id: OrderId,
        expected: TableId,
        actual: TableId,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::ProductUnavailable { .. } => ErrorKind::Validation,

            CoreError::ProductNotFound(_) | CoreError::OrderNotFound { .. } => {
                ErrorKind::NotFound
            }

            CoreError::AlreadyOccupied(_)
            | CoreError::TableNotOccupied(_)
            | CoreError::NotOccupied(_)
            | CoreError::UnpaidBalance { .. }
            | CoreError::InvalidTransition { .. }
            | CoreError::TabSettled(_)
            | CoreError::OrderTableMismatch { .. } => ErrorKind::StateConflict,

            CoreError::InsufficientPayment { .. } => ErrorKind::Payment,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs; never has side effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., two catalog entries with one id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Quantity of zero or less on a cart operation.
    #[error("Invalid quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: i64 },

    /// Submission of a cart with no lines.
    #[error("Cannot submit an empty cart")]
    EmptyCart,

    /// Table numbers start at 1.
    #[error("Invalid table id {0}: tables are numbered from 1")]
    InvalidTableId(TableId),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_cents(6138),
            received: Money::from_cents(5000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total R$ 61.38, received R$ 50.00"
        );

        let err = CoreError::InvalidTransition {
            order_id: 7,
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Order 7 cannot move from delivered to pending");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidQuantity { quantity: 0 };
        assert_eq!(err.to_string(), "Invalid quantity 0: must be at least 1");
        assert_eq!(ValidationError::EmptyCart.to_string(), "Cannot submit an empty cart");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyCart.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptyCart)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::AlreadyOccupied(5).kind(), ErrorKind::StateConflict);
        assert_eq!(
            CoreError::UnpaidBalance {
                table_id: 5,
                total: Money::from_cents(100)
            }
            .kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(CoreError::ProductNotFound(9).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::InsufficientPayment {
                total: Money::from_cents(2),
                received: Money::from_cents(1)
            }
            .kind(),
            ErrorKind::Payment
        );
    }
}
