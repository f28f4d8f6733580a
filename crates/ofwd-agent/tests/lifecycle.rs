//! Registration and deregistration against the local packet service.

mod common;

use common::{ipv4_from_d1, mac, three_switches, RecordingDelivery};
use ofwd_agent::{AgentConfig, ForwardingRelay, OutsourcedForwardingApp};
use ofwd_packet::{
    FrameBuilder, InboundPacket, LocalCoreService, LocalPacketService, PacketContext,
    PacketProcessor, PacketService, ProcessorPriority,
};
use ofwd_types::{ether_types, VlanId};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Fixture {
    packets: Arc<LocalPacketService>,
    app: OutsourcedForwardingApp,
    recorder: Arc<RecordingDelivery>,
}

fn fixture() -> Fixture {
    let (hosts, topology) = three_switches();
    let recorder = RecordingDelivery::new();
    let relay = Arc::new(ForwardingRelay::new(hosts, topology, recorder.clone()));

    let packets = Arc::new(LocalPacketService::new());
    let app = OutsourcedForwardingApp::new(
        AgentConfig::default().application,
        packets.clone(),
        Arc::new(LocalCoreService::new()),
        relay,
    );
    Fixture {
        packets,
        app,
        recorder,
    }
}

fn frame(ether_type: u16, vlan: VlanId) -> InboundPacket {
    let data = FrameBuilder::new(mac(1), mac(3))
        .vlan(vlan)
        .ether_type(ether_type)
        .build();
    InboundPacket::new("D1/1".parse().unwrap(), data)
}

/// Takes every packet it sees.
struct Claimer;

impl PacketProcessor for Claimer {
    fn process(&self, context: &PacketContext) {
        context.block();
    }
}

#[test]
fn test_nothing_reaches_relay_before_start() {
    let f = fixture();
    assert!(f.packets.dispatch(ipv4_from_d1(3)).is_none());
    assert_eq!(f.recorder.count(), 0);
}

#[test]
fn test_started_relay_sees_ipv4_and_ipv6() {
    let f = fixture();
    f.app.activate().unwrap();
    assert_eq!(
        f.app.application_id().map(|id| id.name().to_string()),
        Some("ir.ac.ut.outsourcedforwarding".to_string())
    );

    f.packets.dispatch(frame(ether_types::IPV4, VlanId::NONE));
    f.packets.dispatch(frame(ether_types::IPV6, VlanId::NONE));
    assert_eq!(f.recorder.count(), 2);

    // ARP is not intercepted.
    assert!(f.packets.dispatch(frame(ether_types::ARP, VlanId::NONE)).is_none());
    assert_eq!(f.recorder.count(), 2);
}

#[test]
fn test_vlan_tagged_host_is_distinct() {
    let f = fixture();
    f.app.activate().unwrap();

    // The known host is untagged; the same MAC on VLAN 10 is unknown.
    let ctx = f
        .packets
        .dispatch(frame(ether_types::IPV4, VlanId::new(10).unwrap()))
        .unwrap();
    assert!(!ctx.is_handled());
    assert_eq!(f.recorder.count(), 0);
}

#[test]
fn test_stop_withdraws_everything() {
    let f = fixture();
    f.app.activate().unwrap();
    f.app.deactivate();

    assert!(!f.app.is_active());
    assert_eq!(f.packets.processor_count(), 0);
    assert!(f.packets.intercepts().is_empty());
    assert!(f.packets.dispatch(ipv4_from_d1(3)).is_none());
    assert_eq!(f.recorder.count(), 0);
}

#[test]
fn test_earlier_processor_claim_is_respected() {
    let f = fixture();
    f.app.activate().unwrap();
    f.packets
        .add_processor(Arc::new(Claimer), ProcessorPriority::director(1));

    let ctx = f.packets.dispatch(ipv4_from_d1(3)).unwrap();
    assert!(ctx.is_handled());
    assert_eq!(f.recorder.count(), 0);
}

#[test]
fn test_relay_never_claims_packets() {
    let f = fixture();
    f.app.activate().unwrap();

    let ctx = f.packets.dispatch(ipv4_from_d1(3)).unwrap();
    assert!(!ctx.is_handled());
    assert_eq!(f.recorder.count(), 1);
}

#[test]
fn test_restart_after_stop() {
    let f = fixture();
    f.app.activate().unwrap();
    f.app.deactivate();
    f.app.activate().unwrap();

    assert_eq!(f.packets.processor_count(), 1);
    assert_eq!(f.packets.intercepts().len(), 2);
    f.packets.dispatch(ipv4_from_d1(3));
    assert_eq!(f.recorder.count(), 1);
}
