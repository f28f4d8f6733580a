//! Flat, per-event copy of the topology graph.

use ofwd_topology::TopologyGraph;
use ofwd_types::{DeviceId, Link};
use std::fmt;

/// Directed device-to-device edge; port information is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkEdge {
    pub src: DeviceId,
    pub dst: DeviceId,
}

impl LinkEdge {
    pub fn new(src: DeviceId, dst: DeviceId) -> Self {
        Self { src, dst }
    }
}

impl From<&Link> for LinkEdge {
    fn from(link: &Link) -> Self {
        LinkEdge::new(link.src.device_id.clone(), link.dst.device_id.clone())
    }
}

impl fmt::Display for LinkEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.src, self.dst)
    }
}

/// Vertices and edges of the topology at the moment of an event.
///
/// Holds one entry per graph vertex and one per graph link. Order follows
/// the graph's iteration order and is not meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologySnapshot {
    vertices: Vec<DeviceId>,
    edges: Vec<LinkEdge>,
}

impl TopologySnapshot {
    pub fn new(vertices: Vec<DeviceId>, edges: Vec<LinkEdge>) -> Self {
        Self { vertices, edges }
    }

    pub fn from_graph(graph: &TopologyGraph) -> Self {
        Self {
            vertices: graph.vertexes().cloned().collect(),
            edges: graph.edges().map(LinkEdge::from).collect(),
        }
    }

    pub fn vertices(&self) -> &[DeviceId] {
        &self.vertices
    }

    pub fn edges(&self) -> &[LinkEdge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }
}
