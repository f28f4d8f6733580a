//! Inbound packet events.

use crate::ethernet::EthernetFrame;
use bytes::Bytes;
use ofwd_types::ConnectPoint;
use std::sync::atomic::{AtomicBool, Ordering};

/// A frame punted to the controller, together with where it entered the network.
#[derive(Debug, Clone)]
pub struct InboundPacket {
    received_from: ConnectPoint,
    data: Bytes,
}

impl InboundPacket {
    pub fn new(received_from: ConnectPoint, data: impl Into<Bytes>) -> Self {
        Self {
            received_from,
            data: data.into(),
        }
    }

    /// Device port that originally received the frame.
    pub fn received_from(&self) -> &ConnectPoint {
        &self.received_from
    }

    /// Ethernet view of the frame, or `None` if it does not parse as Ethernet.
    pub fn parsed(&self) -> Option<EthernetFrame> {
        EthernetFrame::parse(&self.data)
    }
}

/// Per-packet context shared by every processor that sees the packet.
///
/// The handled flag belongs to the interception subsystem: a processor that
/// takes ownership of a packet calls [`PacketContext::block`], and later
/// processors observe it through [`PacketContext::is_handled`].
#[derive(Debug)]
pub struct PacketContext {
    inbound: InboundPacket,
    handled: AtomicBool,
}

impl PacketContext {
    pub fn new(inbound: InboundPacket) -> Self {
        Self {
            inbound,
            handled: AtomicBool::new(false),
        }
    }

    pub fn in_packet(&self) -> &InboundPacket {
        &self.inbound
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::Acquire)
    }

    /// Marks the packet as handled. Returns true if this call changed the flag.
    pub fn block(&self) -> bool {
        !self.handled.swap(true, Ordering::AcqRel)
    }
}
