//! In-process packet and core services.
//!
//! These stand in for the controller when the relay runs outside of it
//! (replay tool, integration tests). Dispatch follows the controller's
//! contract: only frames matching an active intercept reach processors, and
//! every processor sees the same [`PacketContext`] in priority order.

use crate::application::{ApplicationId, CoreService};
use crate::context::{InboundPacket, PacketContext};
use crate::error::{PacketError, PacketResult};
use crate::processor::{PacketProcessor, ProcessorPriority};
use crate::service::{PacketPriority, PacketService, ProcessorId, TrafficSelector};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// An active intercept request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intercept {
    pub selector: TrafficSelector,
    pub priority: PacketPriority,
    pub app: ApplicationId,
}

struct Registration {
    id: ProcessorId,
    priority: ProcessorPriority,
    processor: Arc<dyn PacketProcessor>,
}

/// Thread-safe in-memory [`PacketService`].
///
/// `dispatch` may be called concurrently from any number of threads; the
/// processor list is snapshotted per packet, so registration changes never
/// block packets that are already being processed.
#[derive(Default)]
pub struct LocalPacketService {
    processors: RwLock<Vec<Registration>>,
    intercepts: RwLock<Vec<Intercept>>,
    next_id: AtomicU64,
}

impl LocalPacketService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one inbound packet to the processor chain.
    ///
    /// Returns `None` if no active intercept matches the frame (the packet
    /// would never have reached the controller), otherwise the context after
    /// every processor ran.
    pub fn dispatch(&self, packet: InboundPacket) -> Option<PacketContext> {
        let intercepted = match packet.parsed() {
            Some(frame) => self
                .intercepts
                .read()
                .iter()
                .any(|intercept| intercept.selector.matches(&frame)),
            None => false,
        };
        if !intercepted {
            trace!(from = %packet.received_from(), "Packet not intercepted");
            return None;
        }

        let chain: Vec<Arc<dyn PacketProcessor>> = self
            .processors
            .read()
            .iter()
            .map(|registration| Arc::clone(&registration.processor))
            .collect();

        let context = PacketContext::new(packet);
        for processor in chain {
            trace!(processor = processor.name(), "Dispatching packet");
            processor.process(&context);
        }
        Some(context)
    }

    /// Number of registered processors.
    pub fn processor_count(&self) -> usize {
        self.processors.read().len()
    }

    /// Priorities of the registered processors in dispatch order.
    pub fn processor_priorities(&self) -> Vec<ProcessorPriority> {
        self.processors.read().iter().map(|r| r.priority).collect()
    }

    /// Snapshot of the active intercept requests.
    pub fn intercepts(&self) -> Vec<Intercept> {
        self.intercepts.read().clone()
    }
}

impl PacketService for LocalPacketService {
    fn add_processor(
        &self,
        processor: Arc<dyn PacketProcessor>,
        priority: ProcessorPriority,
    ) -> ProcessorId {
        let id = ProcessorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut processors = self.processors.write();

        // Stable insert: equal priorities keep registration order.
        let position = processors.partition_point(|r| r.priority <= priority);
        processors.insert(
            position,
            Registration {
                id,
                priority,
                processor,
            },
        );

        debug!(%id, %priority, "Added packet processor");
        id
    }

    fn remove_processor(&self, id: ProcessorId) -> bool {
        let mut processors = self.processors.write();
        let before = processors.len();
        processors.retain(|r| r.id != id);

        let removed = processors.len() != before;
        if removed {
            debug!(%id, "Removed packet processor");
        } else {
            warn!(%id, "Attempted to remove unknown packet processor");
        }
        removed
    }

    fn request_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app: &ApplicationId,
    ) -> PacketResult<()> {
        if selector.is_empty() {
            return Err(PacketError::invalid_selector(
                "intercept requests must match on EtherType",
            ));
        }

        let intercept = Intercept {
            selector,
            priority,
            app: app.clone(),
        };
        let mut intercepts = self.intercepts.write();
        if !intercepts.contains(&intercept) {
            info!(%selector, ?priority, %app, "Requested packet intercept");
            intercepts.push(intercept);
        }
        Ok(())
    }

    fn cancel_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app: &ApplicationId,
    ) -> PacketResult<()> {
        let mut intercepts = self.intercepts.write();
        intercepts.retain(|i| !(i.selector == selector && i.priority == priority && &i.app == app));
        info!(%selector, ?priority, %app, "Cancelled packet intercept");
        Ok(())
    }
}

/// In-memory [`CoreService`] handing out sequential application ids.
#[derive(Debug, Default)]
pub struct LocalCoreService {
    applications: Mutex<HashMap<String, ApplicationId>>,
}

impl LocalCoreService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoreService for LocalCoreService {
    fn register_application(&self, name: &str) -> PacketResult<ApplicationId> {
        if name.trim().is_empty() {
            return Err(PacketError::InvalidApplication {
                name: name.to_string(),
            });
        }

        let mut applications = self.applications.lock();
        if let Some(existing) = applications.get(name) {
            return Ok(existing.clone());
        }

        let next = u16::try_from(applications.len() + 1).map_err(|_| {
            PacketError::unavailable("application id space exhausted")
        })?;
        let app = ApplicationId::new(next, name);
        applications.insert(name.to_string(), app.clone());
        info!(%app, "Registered application");
        Ok(app)
    }
}
