//! Packet service trait, intercept selectors and priorities.

use crate::application::ApplicationId;
use crate::error::PacketResult;
use crate::ethernet::EthernetFrame;
use crate::processor::{PacketProcessor, ProcessorPriority};
use std::fmt;
use std::sync::Arc;

/// Handle returned when a processor is registered; used to deregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorId(pub u64);

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "processor-{}", self.0)
    }
}

/// Priority of the forwarding rules that punt matching packets to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketPriority {
    /// Control protocols (LLDP, ARP handled by the controller itself).
    Control,
    /// First packets of flows that have no forwarding state yet.
    Reactive,
    /// Catch-all.
    Lowest,
}

impl PacketPriority {
    /// Flow rule priority installed for this class of intercept.
    pub const fn rule_priority(&self) -> u16 {
        match self {
            PacketPriority::Control => 40000,
            PacketPriority::Reactive => 5,
            PacketPriority::Lowest => 0,
        }
    }
}

/// Header match for packet intercept requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TrafficSelector {
    eth_type: Option<u16>,
}

impl TrafficSelector {
    pub fn builder() -> TrafficSelectorBuilder {
        TrafficSelectorBuilder::default()
    }

    pub fn eth_type(&self) -> Option<u16> {
        self.eth_type
    }

    /// Returns true if the selector matches no header fields.
    pub fn is_empty(&self) -> bool {
        self.eth_type.is_none()
    }

    /// Returns true if `frame` satisfies every criterion of this selector.
    pub fn matches(&self, frame: &EthernetFrame) -> bool {
        self.eth_type
            .map_or(true, |eth_type| eth_type == frame.ether_type)
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eth_type {
            Some(eth_type) => write!(f, "ETH_TYPE:0x{eth_type:04x}"),
            None => f.write_str("ANY"),
        }
    }
}

/// Builder for [`TrafficSelector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficSelectorBuilder {
    eth_type: Option<u16>,
}

impl TrafficSelectorBuilder {
    pub fn match_eth_type(mut self, eth_type: u16) -> Self {
        self.eth_type = Some(eth_type);
        self
    }

    pub fn build(self) -> TrafficSelector {
        TrafficSelector {
            eth_type: self.eth_type,
        }
    }
}

/// The controller's packet interception subsystem.
pub trait PacketService: Send + Sync {
    /// Adds a processor to the dispatch chain.
    fn add_processor(
        &self,
        processor: Arc<dyn PacketProcessor>,
        priority: ProcessorPriority,
    ) -> ProcessorId;

    /// Removes a processor. Returns false if the id was not registered.
    fn remove_processor(&self, id: ProcessorId) -> bool;

    /// Asks for packets matching `selector` to be punted to the controller.
    fn request_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app: &ApplicationId,
    ) -> PacketResult<()>;

    /// Withdraws an earlier intercept request.
    fn cancel_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app: &ApplicationId,
    ) -> PacketResult<()>;
}
