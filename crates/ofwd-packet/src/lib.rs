//! Packet interception boundary.
//!
//! This crate describes what the relay needs from the controller's packet
//! subsystem and nothing more:
//!
//! - [`PacketProcessor`]: callback invoked once per intercepted packet
//! - [`PacketService`]: processor registration and intercept requests
//! - [`CoreService`]: application identity registration
//! - [`PacketContext`] / [`InboundPacket`]: the event handed to processors
//! - [`EthernetFrame`]: parsed Ethernet header view of an inbound packet
//!
//! [`LocalPacketService`] and [`LocalCoreService`] are in-process
//! implementations used by the replay tool and the test suites.
//!
//! # Dispatch model
//!
//! ```text
//!  frame ──▶ intercept selectors ──▶ processors in priority order
//!            (eth type match)        advisor < director < observer
//!                                         │
//!                                         ▼
//!                               PacketContext (shared handled flag)
//! ```

mod application;
mod context;
mod error;
mod ethernet;
mod local;
mod processor;
mod service;

pub use application::{ApplicationId, CoreService};
pub use context::{InboundPacket, PacketContext};
pub use error::{PacketError, PacketResult};
pub use ethernet::{EthernetFrame, FrameBuilder};
pub use local::{Intercept, LocalCoreService, LocalPacketService};
pub use processor::{PacketProcessor, ProcessorPriority};
pub use service::{PacketPriority, PacketService, ProcessorId, TrafficSelector, TrafficSelectorBuilder};
