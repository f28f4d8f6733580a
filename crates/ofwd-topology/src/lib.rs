//! Host resolution and topology boundary.
//!
//! - [`HostService`]: maps a [`HostId`](ofwd_types::HostId) to the located host, if known
//! - [`TopologyService`]: hands out point-in-time copies of the device/link graph
//!
//! [`HostStore`] and [`TopologyStore`] are in-memory implementations backed
//! by `parking_lot` read/write locks; readers never block each other.

mod host;
mod topology;

pub use host::{HostService, HostStore};
pub use topology::{TopologyGraph, TopologyService, TopologyStore};
