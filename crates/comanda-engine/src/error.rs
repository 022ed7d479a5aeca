//! # Engine Error Types
//!
//! Error types for the async service layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Core           │  │   Transport     │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Timeout        │  │  InvalidConfig          │ │
//! │  │  StateConflict  │  │  CatalogUnavail │  │  ConfigLoadFailed       │ │
//! │  │  Payment        │  │  Backend        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Only the middle column is retryable.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use comanda_core::{CoreError, ErrorKind, OrderId, TableId};
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for collaborator calls.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// Transport Error
// =============================================================================

/// A collaborator call that did not complete.
///
/// Raised before any in-memory state is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not answer within the configured timeout.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The catalog provider could not deliver the menu.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The order or table backend answered with a failure.
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl TransportError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        TransportError::Backend {
            operation,
            message: message.into(),
        }
    }
}

// =============================================================================
// Engine Error
// =============================================================================

/// Everything a caller of the engine can get back.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule rejected the request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The table id was never seen by the registry.
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    /// No occupied table holds the order.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A collaborator call failed or timed out.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid engine configuration.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<comanda_core::ValidationError> for EngineError {
    fn from(err: comanda_core::ValidationError) -> Self {
        EngineError::Core(err.into())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl EngineError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Core(err) => err.kind(),
            EngineError::TableNotFound(_) | EngineError::OrderNotFound(_) => ErrorKind::NotFound,
            EngineError::Transport(_) => ErrorKind::Transport,
            EngineError::InvalidConfig(_) | EngineError::ConfigLoadFailed(_) => {
                ErrorKind::Configuration
            }
        }
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// State conflicts and validation failures fail the same way again, so
    /// only transport errors qualify.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comanda_core::ValidationError;

    #[test]
    fn test_retryable_errors() {
        let timeout = EngineError::from(TransportError::Timeout {
            operation: "create_order",
            timeout_ms: 2000,
        });
        assert!(timeout.is_retryable());
        assert!(EngineError::from(TransportError::CatalogUnavailable("down".into())).is_retryable());

        assert!(!EngineError::from(CoreError::AlreadyOccupied(5)).is_retryable());
        assert!(!EngineError::TableNotFound(5).is_retryable());
        assert!(!EngineError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(EngineError::TableNotFound(9).kind(), ErrorKind::NotFound);
        assert_eq!(
            EngineError::from(ValidationError::EmptyCart).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::from(CoreError::TabSettled(1)).kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            EngineError::ConfigLoadFailed("missing".into()).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::from(TransportError::Timeout {
            operation: "create_order",
            timeout_ms: 150,
        });
        assert_eq!(err.to_string(), "create_order timed out after 150 ms");

        let err = EngineError::from(CoreError::AlreadyOccupied(5));
        assert_eq!(err.to_string(), "Table 5 is already occupied");
    }
}
