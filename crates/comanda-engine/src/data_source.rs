//! # Data Source
//!
//! Which collaborators the engine talks to, chosen once at construction.
//!
//! ```text
//!   EngineConfig.data_source.mode
//!            │
//!     ┌──────┴───────┐
//!     ▼              ▼
//!   Live           Fixture
//!   (caller's      (FixtureBackend:
//!    ports)         menu in memory)
//! ```
//!
//! There is no silent fallback from one to the other: a live backend that
//! fails surfaces a transport error.

use std::sync::Arc;

use crate::config::DataSourceMode;
use crate::error::{EngineError, EngineResult};
use crate::fixture::FixtureBackend;
use crate::ports::{CatalogProvider, OrderGateway, TableGateway};

/// The engine's collaborators.
#[derive(Debug, Clone)]
pub enum DataSource {
    Live {
        catalog: Arc<dyn CatalogProvider>,
        orders: Arc<dyn OrderGateway>,
        tables: Arc<dyn TableGateway>,
    },
    Fixture(Arc<FixtureBackend>),
}

impl DataSource {
    pub fn live(
        catalog: Arc<dyn CatalogProvider>,
        orders: Arc<dyn OrderGateway>,
        tables: Arc<dyn TableGateway>,
    ) -> Self {
        DataSource::Live {
            catalog,
            orders,
            tables,
        }
    }

    /// Fixture backend with the demo menu.
    pub fn fixture() -> Self {
        DataSource::Fixture(Arc::new(FixtureBackend::new()))
    }

    /// Builds the source a config asks for.
    ///
    /// Live collaborators cannot be described in a config file, so `Live`
    /// must be built with [`DataSource::live`].
    pub fn for_mode(mode: DataSourceMode) -> EngineResult<Self> {
        match mode {
            DataSourceMode::Fixture => Ok(Self::fixture()),
            DataSourceMode::Live => Err(EngineError::InvalidConfig(
                "live data source needs collaborators; build it with DataSource::live".into(),
            )),
        }
    }

    pub fn mode(&self) -> DataSourceMode {
        match self {
            DataSource::Live { .. } => DataSourceMode::Live,
            DataSource::Fixture(_) => DataSourceMode::Fixture,
        }
    }

    pub fn catalog(&self) -> &dyn CatalogProvider {
        match self {
            DataSource::Live { catalog, .. } => catalog.as_ref(),
            DataSource::Fixture(backend) => backend.as_ref(),
        }
    }

    pub fn orders(&self) -> &dyn OrderGateway {
        match self {
            DataSource::Live { orders, .. } => orders.as_ref(),
            DataSource::Fixture(backend) => backend.as_ref(),
        }
    }

    pub fn tables(&self) -> &dyn TableGateway {
        match self {
            DataSource::Live { tables, .. } => tables.as_ref(),
            DataSource::Fixture(backend) => backend.as_ref(),
        }
    }

    /// The fixture backend, for fault injection in tests and demos.
    pub fn fixture_backend(&self) -> Option<&Arc<FixtureBackend>> {
        match self {
            DataSource::Fixture(backend) => Some(backend),
            DataSource::Live { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode() {
        let source = DataSource::for_mode(DataSourceMode::Fixture).unwrap();
        assert_eq!(source.mode(), DataSourceMode::Fixture);
        assert!(source.fixture_backend().is_some());

        assert!(matches!(
            DataSource::for_mode(DataSourceMode::Live),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_live_wraps_given_ports() {
        let backend = Arc::new(FixtureBackend::new());
        backend.set_price(2, 650).await;

        let source = DataSource::live(backend.clone(), backend.clone(), backend);
        assert_eq!(source.mode(), DataSourceMode::Live);
        assert!(source.fixture_backend().is_none());

        let products = source.catalog().list_products().await.unwrap();
        assert_eq!(products[1].price_cents, 650);
    }
}
