//! ofwd-agent - Outsourced Forwarding Relay
//!
//! Observes first-packet-of-flow events intercepted by the controller and,
//! for every event whose destination host is known, relays a snapshot of the
//! current topology to an external decision service over HTTP.
//!
//! # Architecture
//!
//! ```text
//! PacketService ──▶ ForwardingRelay::process
//!                      │
//!                      ├─ classify()             handled / non-Ethernet ─▶ skip
//!                      ├─ resolve_destination()  unknown host           ─▶ skip
//!                      ├─ TopologySnapshot::from_graph()
//!                      ├─ DeliveryPayload::encode()
//!                      └─ DeliveryClient::deliver()  (best effort, never fails)
//! ```
//!
//! [`OutsourcedForwardingApp`] owns the registration of the relay and its
//! IPv4/IPv6 intercepts for the lifetime of the application.

pub mod app;
pub mod classifier;
pub mod config;
pub mod delivery;
pub mod error;
pub mod payload;
pub mod processor;
pub mod resolve;
pub mod scenario;
pub mod snapshot;

pub use app::OutsourcedForwardingApp;
pub use classifier::{classify, Classification, IneligibleReason};
pub use config::{AgentConfig, ApplicationConfig, DeliveryConfig, DeliveryStrategy};
pub use delivery::{DeliveryClient, DeliveryMode, HttpDelivery, QueuedDelivery};
pub use error::{AgentError, ConfigError, PayloadError, Result};
pub use payload::{DecodedPayload, DeliveryPayload};
pub use processor::ForwardingRelay;
pub use resolve::resolve_destination;
pub use scenario::Scenario;
pub use snapshot::{LinkEdge, TopologySnapshot};
