//! Decides whether an intercepted packet is of interest to the relay.

use ofwd_packet::PacketContext;
use ofwd_types::{DeviceId, HostId};
use std::fmt;

/// Why a packet was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// An earlier processor already took the packet.
    AlreadyHandled,
    /// The frame does not carry a parseable Ethernet header.
    NotEthernet,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::AlreadyHandled => f.write_str("already handled"),
            IneligibleReason::NotEthernet => f.write_str("not ethernet"),
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Eligible {
        /// Device whose port received the frame.
        src_device: DeviceId,
        /// Destination MAC and innermost VLAN of the frame.
        dst_host: HostId,
    },
    Ineligible(IneligibleReason),
}

/// Extracts the source device and destination host key from `context`.
///
/// Only reads the context; the handled flag is never changed.
pub fn classify(context: &PacketContext) -> Classification {
    if context.is_handled() {
        return Classification::Ineligible(IneligibleReason::AlreadyHandled);
    }

    let packet = context.in_packet();
    let Some(frame) = packet.parsed() else {
        return Classification::Ineligible(IneligibleReason::NotEthernet);
    };

    Classification::Eligible {
        src_device: packet.received_from().device_id().clone(),
        dst_host: HostId::new(frame.destination, frame.vlan),
    }
}
