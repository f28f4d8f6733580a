//! End-station identifiers and locations.

use crate::{ConnectPoint, DeviceId, MacAddress, ParseError, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies an end-station by link-layer address and VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostId {
    pub mac: MacAddress,
    pub vlan: VlanId,
}

impl HostId {
    pub const fn new(mac: MacAddress, vlan: VlanId) -> Self {
        Self { mac, vlan }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mac, self.vlan)
    }
}

impl FromStr for HostId {
    type Err = ParseError;

    /// Parses `<mac>/<vlan>`, e.g. `00:00:00:00:00:01/None`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mac, vlan) = s
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidHostId(s.to_string()))?;
        Ok(HostId::new(mac.parse()?, vlan.parse()?))
    }
}

/// The device port a host is currently attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostLocation(ConnectPoint);

impl HostLocation {
    pub fn new(point: ConnectPoint) -> Self {
        HostLocation(point)
    }

    pub fn device_id(&self) -> &DeviceId {
        self.0.device_id()
    }

    pub fn connect_point(&self) -> &ConnectPoint {
        &self.0
    }
}

impl fmt::Display for HostLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A located end-station as reported by host resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub location: HostLocation,
}

impl Host {
    pub fn new(id: HostId, location: HostLocation) -> Self {
        Self { id, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_id_roundtrips_through_display() {
        let id: HostId = "00:00:00:00:00:03/None".parse().unwrap();
        assert!(id.vlan.is_none());
        assert_eq!(id.to_string(), "00:00:00:00:00:03/None");

        let tagged: HostId = "00:00:00:00:00:03/10".parse().unwrap();
        assert_eq!(tagged.vlan.tag(), Some(10));
    }

    #[test]
    fn test_host_id_invalid() {
        assert!("00:00:00:00:00:03".parse::<HostId>().is_err());
        assert!("00:00:00:00:00:03/x".parse::<HostId>().is_err());
    }

    #[test]
    fn test_host_location_device() {
        let location = HostLocation::new("of:3/1".parse().unwrap());
        assert_eq!(location.device_id().as_str(), "of:3");
        assert_eq!(location.to_string(), "of:3/1");
    }
}
