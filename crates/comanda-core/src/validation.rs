//! # Validation Module
//!
//! Input validation for values that cross into the core from the UI or the
//! backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Waiter UI                                                     │
//! │  ├── Basic format checks (empty, numeric)                               │
//! │  └── Immediate feedback                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: comanda-core (THIS MODULE)                                    │
//! │  ├── Quantities, party sizes, table numbers                             │
//! │  └── Catalog entries loaded from the backend                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend collaborator                                          │
//! │  └── Its own constraints, outside this workspace                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comanda_core::validation::{validate_quantity, validate_table_id};
//!
//! assert_eq!(validate_quantity(3).unwrap(), 3);
//! assert!(validate_quantity(0).is_err());
//! assert!(validate_table_id(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Product, TableId};
use crate::{MAX_LINE_QUANTITY, MAX_PARTY_SIZE, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a menu category. Empty is allowed (uncategorised).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.trim().chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity and narrows it to the stored type.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Menu: tap "+" on Hambúrguer                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → InvalidQuantity                                 │
/// │       ├── qty > 999? → OutOfRange                                      │
/// │       └── OK → Cart::add_or_increment                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::InvalidQuantity { quantity: qty });
    }

    if qty > MAX_LINE_QUANTITY as i64 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY as i64,
        });
    }

    Ok(qty as u32)
}

/// Validates a price in centavos.
///
/// ## Rules
/// - Zero is allowed (courtesy items)
/// - At most MAX_PRICE_CENTS, so line, cart and bill totals cannot overflow
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a table number.
pub fn validate_table_id(table_id: TableId) -> ValidationResult<()> {
    if table_id == 0 {
        return Err(ValidationError::InvalidTableId(table_id));
    }

    Ok(())
}

/// Validates the number of guests seated when a table is opened.
///
/// ## Rules
/// - At least 1
/// - At most MAX_PARTY_SIZE (50)
pub fn validate_party_size(people: u32) -> ValidationResult<()> {
    if people == 0 {
        return Err(ValidationError::MustBePositive {
            field: "number of people".to_string(),
        });
    }

    if people > MAX_PARTY_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "number of people".to_string(),
            min: 1,
            max: MAX_PARTY_SIZE as i64,
        });
    }

    Ok(())
}

/// Validates a service charge rate in basis points (0% to 100%).
pub fn validate_service_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "service_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a catalog entry as received from the catalog provider.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id == 0 {
        return Err(ValidationError::MustBePositive {
            field: "product id".to_string(),
        });
    }

    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_price_cents(product.price_cents)
}

// =============================================================================
// Unit Tests
// =============================================================================
