//! # comanda-engine: Table Service Engine for Comanda
//!
//! Async layer over `comanda-core`: it owns the live tabs, talks to the
//! catalog, order and table collaborators, and applies the core rules
//! under a per-table lock.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Table Service Engine                           │
//! │                                                                         │
//! │   waiter / kitchen / cashier                                            │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 TableService (service.rs)                        │  │
//! │  │  open_table, submit_order, update_order_status,                  │  │
//! │  │  resolve_payment, close_table, kitchen_queue                     │  │
//! │  └───────┬──────────────────────┬───────────────────────┬───────────┘  │
//! │          ▼                      ▼                       ▼              │
//! │  ┌────────────────┐  ┌────────────────────┐  ┌──────────────────────┐  │
//! │  │  TabRegistry   │  │    CallPolicy      │  │     DataSource       │  │
//! │  │                │  │                    │  │                      │  │
//! │  │ one Mutex per  │  │ timeout on every   │  │ Live: caller's ports │  │
//! │  │ table          │  │ call, backoff on   │  │ Fixture: in-memory   │  │
//! │  │                │  │ idempotent reads   │  │ demo backend         │  │
//! │  └────────────────┘  └────────────────────┘  └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Engine configuration (TOML file + `COMANDA_*` env)
//! - [`data_source`] - Live or fixture collaborators
//! - [`error`] - Engine and transport error types
//! - [`fixture`] - In-memory backend with fault injection
//! - [`ports`] - Collaborator traits
//! - [`registry`] - Per-table locked tab map
//! - [`retry`] - Timeout and backoff policy
//! - [`service`] - The `TableService` itself
//! - [`telemetry`] - `tracing` subscriber setup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use comanda_engine::{DataSource, EngineConfig, TableService};
//! use comanda_core::{Cart, PaymentMethod};
//!
//! # async fn run() -> comanda_engine::EngineResult<()> {
//! let config = EngineConfig::load_or_default(None);
//! let service = TableService::start(&config, DataSource::fixture()).await?;
//!
//! service.open_table(5, 2).await?;
//! let mut cart = Cart::new(5);
//! service.add_to_cart(&mut cart, 1, 2).await?;
//! service.submit_order(&cart).await?;
//!
//! service.resolve_payment(5, PaymentMethod::Pix, None).await?;
//! let closed = service.close_table(5).await?;
//! println!("Closed table 5 at {}", closed.bill.total);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod data_source;
pub mod error;
pub mod fixture;
pub mod ports;
pub mod registry;
pub mod retry;
pub mod service;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use comanda_core;

pub use config::{BillingConfig, DataSourceConfig, DataSourceMode, EngineConfig, FloorConfig, TransportConfig};
pub use data_source::DataSource;
pub use error::{EngineError, EngineResult, TransportError, TransportResult};
pub use fixture::{fixture_menu, FixtureBackend};
pub use ports::{CatalogProvider, OrderGateway, TableGateway};
pub use registry::{TabHandle, TabRegistry};
pub use retry::CallPolicy;
pub use service::TableService;
pub use telemetry::init_tracing;
