//! Read-only access to the registry and the check-in store.

use std::sync::Arc;

use checkin_core::{CheckIn, ClientEntry};

use crate::registry::ConnectionRegistry;
use crate::store::CheckInStore;

/// Snapshot accessors for external readers such as HTTP handlers.
#[derive(Clone)]
pub struct QuerySurface {
    registry: Arc<ConnectionRegistry>,
    store: Arc<CheckInStore>,
}

impl QuerySurface {
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<CheckInStore>) -> Self {
        Self { registry, store }
    }

    pub fn list_connections(&self) -> Vec<ClientEntry> {
        self.registry.snapshot()
    }

    pub fn list_state(&self) -> Vec<CheckIn> {
        self.store.snapshot()
    }
}
