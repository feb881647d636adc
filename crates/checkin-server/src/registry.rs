//! Registry of live streaming connections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use checkin_core::{ClientEntry, ClientId, ConnectionHandle};
use parking_lot::Mutex;

/// Concurrent map from connection handle to its client entry.
///
/// Every operation takes the single registry lock for an in-memory update
/// only; no I/O ever happens while it is held.
pub struct ConnectionRegistry {
    clients: Mutex<HashMap<ConnectionHandle, ClientEntry>>,
    next_handle: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Allocate an identity for a freshly accepted connection.
    pub fn next_handle(&self) -> ConnectionHandle {
        ConnectionHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Track `handle` as connected and return its generated client ID.
    ///
    /// Registering a handle that is already present replaces its entry, so a
    /// handle never maps to more than one entry.
    pub fn register(&self, handle: ConnectionHandle) -> ClientId {
        let id = ClientId::new();
        let previous = self
            .clients
            .lock()
            .insert(handle, ClientEntry::connected(id.clone()));
        if let Some(previous) = previous {
            tracing::warn!(%handle, replaced = %previous.id, "handle registered twice");
        }
        id
    }

    /// Stop tracking `handle`. Returns the removed entry, or `None` if the
    /// handle was not registered.
    pub fn unregister(&self, handle: ConnectionHandle) -> Option<ClientEntry> {
        self.clients.lock().remove(&handle)
    }

    /// Point-in-time copy of all entries, ordered by client ID.
    pub fn snapshot(&self) -> Vec<ClientEntry> {
        let mut entries: Vec<ClientEntry> = self.clients.lock().values().cloned().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Number of connected clients.
    pub fn count(&self) -> usize {
        self.clients.lock().len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
