//! Application lifecycle: registration of the relay and its intercepts.

use crate::config::ApplicationConfig;
use crate::error::Result;
use crate::processor::ForwardingRelay;
use ofwd_packet::{
    ApplicationId, CoreService, PacketPriority, PacketProcessor, PacketService, ProcessorId,
    TrafficSelector,
};
use ofwd_types::ether_types;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// EtherTypes the relay asks to see.
const INTERCEPTED_ETHER_TYPES: [u16; 2] = [ether_types::IPV4, ether_types::IPV6];

#[derive(Debug, Clone)]
struct Activation {
    app_id: ApplicationId,
    processor_id: ProcessorId,
}

/// Owns the relay's registration with the controller.
///
/// [`activate`](Self::activate) and [`deactivate`](Self::deactivate) are
/// idempotent and may be called from any thread.
pub struct OutsourcedForwardingApp {
    config: ApplicationConfig,
    packet_service: Arc<dyn PacketService>,
    core_service: Arc<dyn CoreService>,
    relay: Arc<ForwardingRelay>,
    activation: Mutex<Option<Activation>>,
}

fn intercept_selectors() -> impl Iterator<Item = TrafficSelector> {
    INTERCEPTED_ETHER_TYPES
        .into_iter()
        .map(|eth_type| TrafficSelector::builder().match_eth_type(eth_type).build())
}

impl OutsourcedForwardingApp {
    pub fn new(
        config: ApplicationConfig,
        packet_service: Arc<dyn PacketService>,
        core_service: Arc<dyn CoreService>,
        relay: Arc<ForwardingRelay>,
    ) -> Self {
        Self {
            config,
            packet_service,
            core_service,
            relay,
            activation: Mutex::new(None),
        }
    }

    /// Registers the application, adds the relay and requests IPv4/IPv6 intercepts.
    ///
    /// An out-of-band processor priority is rejected before anything is
    /// registered. On any later failure what was already registered is
    /// withdrawn again.
    pub fn activate(&self) -> Result<()> {
        let mut activation = self.activation.lock();
        if activation.is_some() {
            debug!("Already started");
            return Ok(());
        }

        let priority = self.config.priority()?;
        let app_id = self.core_service.register_application(&self.config.name)?;

        let processor: Arc<dyn PacketProcessor> = self.relay.clone();
        let processor_id = self
            .packet_service
            .add_processor(processor, priority);

        let registered = Activation {
            app_id,
            processor_id,
        };
        for selector in intercept_selectors() {
            if let Err(e) = self.packet_service.request_packets(
                selector,
                PacketPriority::Reactive,
                &registered.app_id,
            ) {
                warn!(%selector, error = %e, "Intercept request failed, rolling back");
                self.withdraw(&registered);
                return Err(e.into());
            }
        }

        info!(
            app = %registered.app_id,
            %priority,
            "Started"
        );
        *activation = Some(registered);
        Ok(())
    }

    /// Cancels the intercepts and removes the relay.
    pub fn deactivate(&self) {
        let Some(registered) = self.activation.lock().take() else {
            debug!("Not started");
            return;
        };
        self.withdraw(&registered);
        info!(app = %registered.app_id, "Stopped");
    }

    pub fn is_active(&self) -> bool {
        self.activation.lock().is_some()
    }

    /// Id issued at activation, if active.
    pub fn application_id(&self) -> Option<ApplicationId> {
        self.activation.lock().as_ref().map(|a| a.app_id.clone())
    }

    fn withdraw(&self, registered: &Activation) {
        for selector in intercept_selectors() {
            if let Err(e) = self.packet_service.cancel_packets(
                selector,
                PacketPriority::Reactive,
                &registered.app_id,
            ) {
                warn!(%selector, error = %e, "Failed to cancel intercept");
            }
        }
        self.packet_service.remove_processor(registered.processor_id);
    }
}

impl Drop for OutsourcedForwardingApp {
    fn drop(&mut self) {
        if self.activation.get_mut().is_some() {
            self.deactivate();
        }
    }
}
