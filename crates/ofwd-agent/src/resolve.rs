//! Destination host resolution.

use ofwd_topology::HostService;
use ofwd_types::{DeviceId, HostId};

/// Returns the device the host `dst` is currently attached to.
///
/// `None` means the host is unknown; callers must skip the event.
pub fn resolve_destination(hosts: &dyn HostService, dst: &HostId) -> Option<DeviceId> {
    hosts
        .host(dst)
        .map(|host| host.location.device_id().clone())
}
