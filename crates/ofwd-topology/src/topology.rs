//! Topology graph and service.

use ofwd_types::{DeviceId, Link};
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Devices and directed links known to the controller at one instant.
///
/// Both collections are unordered sets: iteration order is arbitrary and
/// may differ between two copies of the same graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyGraph {
    vertexes: HashSet<DeviceId>,
    edges: HashSet<Link>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertexes(&self) -> impl Iterator<Item = &DeviceId> {
        self.vertexes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Link> {
        self.edges.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertexes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_vertex(&self, device: &DeviceId) -> bool {
        self.vertexes.contains(device)
    }

    /// Adds a device. Returns false if it was already present.
    pub fn insert_vertex(&mut self, device: DeviceId) -> bool {
        self.vertexes.insert(device)
    }

    /// Adds a link. Returns false if it was already present.
    ///
    /// Endpoint devices are added as vertexes if missing, so a graph never
    /// holds an edge without both of its vertexes.
    pub fn insert_edge(&mut self, link: Link) -> bool {
        self.vertexes.insert(link.src.device_id.clone());
        self.vertexes.insert(link.dst.device_id.clone());
        self.edges.insert(link)
    }

    /// Removes a device and every link touching it.
    pub fn remove_vertex(&mut self, device: &DeviceId) -> bool {
        self.edges.retain(|link| !link.touches(device));
        self.vertexes.remove(device)
    }

    pub fn remove_edge(&mut self, link: &Link) -> bool {
        self.edges.remove(link)
    }
}

/// Source of topology graphs.
pub trait TopologyService: Send + Sync {
    /// Returns a copy of the graph as it is right now.
    fn current_graph(&self) -> TopologyGraph;
}

/// In-memory [`TopologyService`].
#[derive(Debug, Default)]
pub struct TopologyStore {
    graph: RwLock<TopologyGraph>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: TopologyGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    pub fn add_device(&self, device: DeviceId) {
        if self.graph.write().insert_vertex(device.clone()) {
            debug!(%device, "Device added");
        }
    }

    pub fn remove_device(&self, device: &DeviceId) {
        if self.graph.write().remove_vertex(device) {
            debug!(%device, "Device removed");
        } else {
            warn!(%device, "Attempted to remove unknown device");
        }
    }

    pub fn add_link(&self, link: Link) {
        let description = link.to_string();
        if self.graph.write().insert_edge(link) {
            debug!(link = %description, "Link added");
        }
    }

    /// Removes a link; both endpoint devices stay.
    pub fn remove_link(&self, link: &Link) {
        if self.graph.write().remove_edge(link) {
            debug!(%link, "Link removed");
        } else {
            warn!(%link, "Attempted to remove unknown link");
        }
    }
}

impl TopologyService for TopologyStore {
    fn current_graph(&self) -> TopologyGraph {
        self.graph.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn device(s: &str) -> DeviceId {
        DeviceId::new(s).unwrap()
    }

    fn link(src: &str, dst: &str) -> Link {
        Link::new(
            format!("{src}/1").parse().unwrap(),
            format!("{dst}/2").parse().unwrap(),
        )
    }

    #[test]
    fn test_empty_graph() {
        let store = TopologyStore::new();
        let graph = store.current_graph();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_imply_vertexes() {
        let mut graph = TopologyGraph::new();
        assert!(graph.insert_edge(link("D1", "D2")));
        assert!(!graph.insert_edge(link("D1", "D2")));

        assert!(graph.contains_vertex(&device("D1")));
        assert!(graph.contains_vertex(&device("D2")));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_device_drops_incident_links() {
        let store = TopologyStore::new();
        store.add_link(link("D1", "D2"));
        store.add_link(link("D2", "D3"));
        store.add_link(link("D3", "D1"));

        store.remove_device(&device("D2"));
        let graph = store.current_graph();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|l| !l.touches(&device("D2"))));
    }

    #[test]
    fn test_remove_link_keeps_devices() {
        let store = TopologyStore::new();
        store.add_link(link("D1", "D2"));
        store.add_link(link("D2", "D1"));

        store.remove_link(&link("D1", "D2"));
        store.remove_link(&link("D1", "D2"));
        let graph = store.current_graph();

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|l| l.src.device_id == device("D2")));
    }

    #[test]
    fn test_store_from_graph() {
        let mut graph = TopologyGraph::new();
        graph.insert_vertex(device("D9"));
        graph.insert_edge(link("D1", "D2"));

        let store = TopologyStore::from_graph(graph.clone());
        assert_eq!(store.current_graph(), graph);
    }

    #[test]
    fn test_current_graph_is_a_copy() {
        let store = TopologyStore::new();
        store.add_device(device("D1"));
        let before = store.current_graph();

        store.add_device(device("D2"));
        assert_eq!(before.vertex_count(), 1);
        assert_eq!(store.current_graph().vertex_count(), 2);
    }
}
