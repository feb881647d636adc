//! The single shared check-in record.

use checkin_core::{CheckIn, CheckInId};
use parking_lot::Mutex;

/// Holder of the process-wide check-in record.
///
/// The record's ID is fixed at construction; only its status changes.
pub struct CheckInStore {
    record: Mutex<CheckIn>,
}

impl CheckInStore {
    /// Create the store with a freshly generated record ID and empty status.
    pub fn new() -> Self {
        Self::with_id(CheckInId::new())
    }

    pub fn with_id(id: CheckInId) -> Self {
        Self {
            record: Mutex::new(CheckIn {
                id,
                status: String::new(),
            }),
        }
    }

    pub fn record_id(&self) -> CheckInId {
        self.record.lock().id.clone()
    }

    /// Replace the record's status, keeping its ID.
    pub fn update(&self, status: impl Into<String>) {
        self.record.lock().status = status.into();
    }

    /// Copy of every record. Always exactly one entry.
    pub fn snapshot(&self) -> Vec<CheckIn> {
        vec![self.record.lock().clone()]
    }
}

impl Default for CheckInStore {
    fn default() -> Self {
        Self::new()
    }
}
