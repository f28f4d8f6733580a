//! Value types shared by the outsourced forwarding relay.
//!
//! These mirror the identifiers a software-defined network controller hands
//! out for the elements it manages:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers, including the untagged sentinel
//! - [`DeviceId`]: opaque identifier of a switch/device in the topology
//! - [`ConnectPoint`] and [`Link`]: device ports and the directed links between them
//! - [`HostId`], [`HostLocation`], [`Host`]: end-stations and where they attach
//! - [`ether_types`]: EtherType constants used for packet intercepts

pub mod ether_types;
mod device;
mod host;
mod mac;
mod vlan;

pub use device::{ConnectPoint, DeviceId, Link, PortNumber};
pub use host::{Host, HostId, HostLocation};
pub use mac::MacAddress;
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid VLAN ID: {0} (must be 0-4095 or None)")]
    InvalidVlanId(String),

    #[error("invalid device ID: {0:?}")]
    InvalidDeviceId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),

    #[error("invalid host ID format: {0} (expected <mac>/<vlan>)")]
    InvalidHostId(String),

    #[error("invalid connect point format: {0} (expected <device>/<port>)")]
    InvalidConnectPoint(String),
}
