//! # Tab Registry
//!
//! Process-wide map of table id to tab, with one lock per table.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RwLock<BTreeMap<TableId, Arc<Mutex<Tab>>>>                             │
//! │     │                                                                   │
//! │     ├── read lock: look up a table's handle, then release               │
//! │     └── write lock: only to register a table id not seen before         │
//! │                                                                         │
//! │  Mutex<Tab> (per table)                                                 │
//! │     held for the whole operation, collaborator call included, so      │
//! │     two waiters on table 5 are serialized while table 6 proceeds        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The map lock is never held while a table lock is awaited.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use comanda_core::{CoreError, Tab, TableId};

use crate::error::{EngineError, EngineResult};

/// Shared handle to one table's tab.
pub type TabHandle = Arc<Mutex<Tab>>;

#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: RwLock<BTreeMap<TableId, TabHandle>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with tables 1..=count registered as FREE.
    pub fn with_tables(count: u32) -> Self {
        let tabs = (1..=count)
            .map(|id| (id, Arc::new(Mutex::new(Tab::free(id)))))
            .collect();

        TabRegistry {
            tabs: RwLock::new(tabs),
        }
    }

    /// Handle for a known table.
    pub async fn get(&self, table_id: TableId) -> EngineResult<TabHandle> {
        self.tabs
            .read()
            .await
            .get(&table_id)
            .cloned()
            .ok_or(EngineError::TableNotFound(table_id))
    }

    /// Handle for a table, registering it as FREE if it is new.
    pub async fn get_or_create(&self, table_id: TableId) -> TabHandle {
        if let Some(handle) = self.tabs.read().await.get(&table_id) {
            return handle.clone();
        }

        let mut tabs = self.tabs.write().await;
        tabs.entry(table_id)
            .or_insert_with(|| {
                debug!(table_id, "Registering new table");
                Arc::new(Mutex::new(Tab::free(table_id)))
            })
            .clone()
    }

    /// Registers a table that is not in the map yet.
    ///
    /// Fails with `AlreadyOccupied` if the id was registered in the meantime.
    pub async fn insert_new(&self, tab: Tab) -> EngineResult<TabHandle> {
        let table_id = tab.id();
        match self.tabs.write().await.entry(table_id) {
            Entry::Occupied(_) => Err(CoreError::AlreadyOccupied(table_id).into()),
            Entry::Vacant(slot) => {
                debug!(table_id, "Registering new table");
                Ok(slot.insert(Arc::new(Mutex::new(tab))).clone())
            }
        }
    }

    /// Replaces a table's state (startup recovery).
    pub async fn restore(&self, tab: Tab) {
        let handle = self.get_or_create(tab.id()).await;
        *handle.lock().await = tab;
    }

    /// Copy of one table's current state.
    pub async fn snapshot(&self, table_id: TableId) -> EngineResult<Tab> {
        let handle = self.get(table_id).await?;
        let tab = handle.lock().await;
        Ok(tab.clone())
    }

    /// Handles of every table, ordered by id.
    pub async fn handles(&self) -> Vec<TabHandle> {
        self.tabs.read().await.values().cloned().collect()
    }

    /// Copies of every table, ordered by id.
    pub async fn list(&self) -> Vec<Tab> {
        let mut tabs = Vec::new();
        for handle in self.handles().await {
            tabs.push(handle.lock().await.clone());
        }
        tabs
    }

    /// Copies of occupied tables, ordered by id.
    pub async fn list_occupied(&self) -> Vec<Tab> {
        let mut tabs = Vec::new();
        for handle in self.handles().await {
            let tab = handle.lock().await;
            if tab.is_occupied() {
                tabs.push(tab.clone());
            }
        }
        tabs
    }

    pub async fn len(&self) -> usize {
        self.tabs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tabs.read().await.is_empty()
    }
}
