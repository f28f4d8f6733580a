//! Host resolution.

use ofwd_types::{Host, HostId, HostLocation};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Resolves end-stations to their current attachment point.
pub trait HostService: Send + Sync {
    /// Returns the host with `id`, or `None` if it is not known (yet).
    fn host(&self, id: &HostId) -> Option<Host>;
}

/// In-memory [`HostService`].
#[derive(Debug, Default)]
pub struct HostStore {
    hosts: RwLock<HashMap<HostId, Host>>,
}

impl HostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host or moves it to a new location.
    pub fn add_host(&self, id: HostId, location: HostLocation) {
        debug!(host = %id, %location, "Host located");
        self.hosts.write().insert(id, Host::new(id, location));
    }

    /// Forgets a host. Returns the removed entry.
    pub fn remove_host(&self, id: &HostId) -> Option<Host> {
        let removed = self.hosts.write().remove(id);
        if removed.is_some() {
            debug!(host = %id, "Host vanished");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }
}

impl HostService for HostStore {
    fn host(&self, id: &HostId) -> Option<Host> {
        self.hosts.read().get(id).cloned()
    }
}
