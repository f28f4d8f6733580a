//! The packet processor that ties classification, resolution, snapshot and delivery together.

use crate::classifier::{classify, Classification};
use crate::delivery::DeliveryClient;
use crate::payload::DeliveryPayload;
use crate::resolve::resolve_destination;
use crate::snapshot::TopologySnapshot;
use ofwd_packet::{PacketContext, PacketProcessor};
use ofwd_topology::{HostService, TopologyService};
use ofwd_types::{DeviceId, HostId};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Relays a topology snapshot for every eligible first packet.
///
/// Holds no per-event state; concurrent calls to `process` are independent.
/// The packet context is never modified, so other processors see the
/// packet exactly as they would without the relay.
#[derive(Clone)]
pub struct ForwardingRelay {
    hosts: Arc<dyn HostService>,
    topology: Arc<dyn TopologyService>,
    delivery: Arc<dyn DeliveryClient>,
}

impl ForwardingRelay {
    pub fn new(
        hosts: Arc<dyn HostService>,
        topology: Arc<dyn TopologyService>,
        delivery: Arc<dyn DeliveryClient>,
    ) -> Self {
        Self {
            hosts,
            topology,
            delivery,
        }
    }

    /// Builds the payload `context` would produce, without delivering it.
    pub fn build_payload(&self, context: &PacketContext) -> Option<DeliveryPayload> {
        match classify(context) {
            Classification::Eligible {
                src_device,
                dst_host,
            } => self.assemble(src_device, &dst_host),
            Classification::Ineligible(_) => None,
        }
    }

    #[instrument(level = "debug", skip_all, fields(src = %src, dst_host = %dst_host))]
    fn relay(&self, src: DeviceId, dst_host: &HostId) {
        if let Some(payload) = self.assemble(src, dst_host) {
            self.delivery.deliver(&payload);
        }
    }

    fn assemble(&self, src: DeviceId, dst_host: &HostId) -> Option<DeliveryPayload> {
        let Some(dst) = resolve_destination(self.hosts.as_ref(), dst_host) else {
            debug!("Destination host not found, skipping");
            return None;
        };

        let snapshot = TopologySnapshot::from_graph(&self.topology.current_graph());
        debug!(
            %dst,
            vertices = snapshot.vertex_count(),
            edges = snapshot.edge_count(),
            "Topology snapshot taken"
        );
        Some(DeliveryPayload::new(src, dst, snapshot))
    }
}

impl PacketProcessor for ForwardingRelay {
    fn process(&self, context: &PacketContext) {
        let (src, dst_host) = match classify(context) {
            Classification::Eligible {
                src_device,
                dst_host,
            } => (src_device, dst_host),
            Classification::Ineligible(reason) => {
                trace!(%reason, "Ignoring packet");
                return;
            }
        };

        self.relay(src, &dst_host);
    }

    fn name(&self) -> &str {
        "outsourced-forwarding"
    }
}
