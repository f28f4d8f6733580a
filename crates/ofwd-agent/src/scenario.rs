//! Replay scenarios: a small network plus the frames to inject into it.
//!
//! ```toml
//! devices = ["D1", "D2", "D3"]
//!
//! [[links]]
//! src = "D1/2"
//! dst = "D2/1"
//!
//! [[hosts]]
//! id = "00:00:00:00:00:03/None"
//! location = "D3/1"
//!
//! [[frames]]
//! in_port = "D1/1"
//! src_mac = "00:00:00:00:00:01"
//! dst_mac = "00:00:00:00:00:03"
//! ether_type = "ipv4"      # ipv4, ipv6, arp or a hex value such as "0x88cc"
//! vlan = "None"            # optional
//! ```

use crate::error::{AgentError, Result};
use ofwd_packet::{FrameBuilder, InboundPacket};
use ofwd_topology::{HostStore, TopologyGraph, TopologyStore};
use ofwd_types::{ether_types, ConnectPoint, DeviceId, HostId, HostLocation, Link, MacAddress, VlanId};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    pub id: String,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameSpec {
    pub in_port: String,
    pub src_mac: MacAddress,
    pub dst_mac: MacAddress,
    #[serde(default = "default_ether_type")]
    pub ether_type: String,
    #[serde(default)]
    pub vlan: VlanId,
}

fn default_ether_type() -> String {
    "ipv4".to_string()
}

/// A network and a sequence of frames entering it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub devices: Vec<DeviceId>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
    #[serde(default)]
    pub frames: Vec<FrameSpec>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AgentError::scenario(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AgentError::scenario(format!("{}: {e}", path.display())))
    }

    /// Devices and links as a topology store. Link endpoints need not be
    /// listed under `devices`.
    pub fn topology(&self) -> Result<TopologyStore> {
        let mut graph = TopologyGraph::new();
        for device in &self.devices {
            graph.insert_vertex(device.clone());
        }
        for link in &self.links {
            let src: ConnectPoint = link.src.parse()?;
            let dst: ConnectPoint = link.dst.parse()?;
            graph.insert_edge(Link::new(src, dst));
        }
        Ok(TopologyStore::from_graph(graph))
    }

    /// Host locations as a host store.
    pub fn hosts(&self) -> Result<HostStore> {
        let store = HostStore::new();
        for host in &self.hosts {
            let id: HostId = host.id.parse()?;
            let location: ConnectPoint = host.location.parse()?;
            store.add_host(id, HostLocation::new(location));
        }
        Ok(store)
    }

    /// Synthesised inbound packets, in scenario order.
    pub fn packets(&self) -> Result<Vec<InboundPacket>> {
        self.frames
            .iter()
            .map(|frame| {
                let in_port: ConnectPoint = frame.in_port.parse()?;
                let ether_type = parse_ether_type(&frame.ether_type)?;
                let data = FrameBuilder::new(frame.src_mac, frame.dst_mac)
                    .vlan(frame.vlan)
                    .ether_type(ether_type)
                    .build();
                Ok(InboundPacket::new(in_port, data))
            })
            .collect()
    }
}

fn parse_ether_type(value: &str) -> Result<u16> {
    match value.to_ascii_lowercase().as_str() {
        "ipv4" => Ok(ether_types::IPV4),
        "ipv6" => Ok(ether_types::IPV6),
        "arp" => Ok(ether_types::ARP),
        other => other
            .strip_prefix("0x")
            .and_then(|hex| u16::from_str_radix(hex, 16).ok())
            .ok_or_else(|| AgentError::scenario(format!("unknown ether_type {value:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofwd_topology::{HostService, TopologyService};
    use pretty_assertions::assert_eq;

    const THREE_SWITCHES: &str = r#"
devices = ["D1", "D2", "D3"]

[[links]]
src = "D1/2"
dst = "D2/1"

[[links]]
src = "D2/2"
dst = "D3/1"

[[hosts]]
id = "00:00:00:00:00:03/None"
location = "D3/3"

[[frames]]
in_port = "D1/1"
src_mac = "00:00:00:00:00:01"
dst_mac = "00:00:00:00:00:03"

[[frames]]
in_port = "D1/1"
src_mac = "00:00:00:00:00:01"
dst_mac = "00:00:00:00:00:03"
ether_type = "ipv6"
vlan = "100"
"#;

    #[test]
    fn test_build_collaborators() {
        let scenario = Scenario::from_toml_str(THREE_SWITCHES).unwrap();

        let graph = scenario.topology().unwrap().current_graph();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let hosts = scenario.hosts().unwrap();
        let host = hosts.host(&"00:00:00:00:00:03/None".parse().unwrap()).unwrap();
        assert_eq!(host.location.device_id().as_str(), "D3");
    }

    #[test]
    fn test_link_endpoints_become_devices() {
        let scenario =
            Scenario::from_toml_str("[[links]]\nsrc = \"S1/1\"\ndst = \"S2/1\"\n").unwrap();
        let graph = scenario.topology().unwrap().current_graph();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_packets() {
        let scenario = Scenario::from_toml_str(THREE_SWITCHES).unwrap();
        let packets = scenario.packets().unwrap();
        assert_eq!(packets.len(), 2);

        let first = packets[0].parsed().unwrap();
        assert!(first.is_ipv4());
        assert!(first.vlan.is_none());

        let second = packets[1].parsed().unwrap();
        assert!(second.is_ipv6());
        assert_eq!(second.vlan.tag(), Some(100));
        assert_eq!(packets[1].received_from().to_string(), "D1/1");
    }

    #[test]
    fn test_parse_ether_type() {
        assert_eq!(parse_ether_type("IPv6").unwrap(), ether_types::IPV6);
        assert_eq!(parse_ether_type("0x88cc").unwrap(), 0x88cc);
        assert!(parse_ether_type("lldp").is_err());
    }

    #[test]
    fn test_bundled_demo_parses() {
        let scenario =
            Scenario::from_toml_str(include_str!("../../../demos/three-switches.toml")).unwrap();
        assert_eq!(scenario.packets().unwrap().len(), 4);
        assert!(scenario.topology().is_ok());
        assert!(scenario.hosts().is_ok());
    }

    #[test]
    fn test_rejects_bad_entries() {
        let scenario = Scenario::from_toml_str("[[links]]\nsrc = \"D1\"\ndst = \"D2/1\"\n").unwrap();
        assert!(matches!(scenario.topology(), Err(AgentError::Parse(_))));

        assert!(Scenario::from_toml_str("switches = []").is_err());
    }
}
