//! Ethernet header parsing and frame synthesis.

use ofwd_types::{ether_types, MacAddress, VlanId};
use pnet::datalink::MacAddr;
use pnet::packet::ethernet::{EtherType, EthernetPacket, MutableEthernetPacket};
use pnet::packet::vlan::{MutableVlanPacket, VlanPacket};
use pnet::packet::Packet;

const ETH_HDR_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;

/// Maximum number of stacked VLAN tags peeled while looking for the payload type.
const MAX_VLAN_TAGS: usize = 2;

/// Parsed Ethernet II header of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetFrame {
    pub destination: MacAddress,
    pub source: MacAddress,
    /// Innermost VLAN tag, or [`VlanId::NONE`] for untagged frames.
    pub vlan: VlanId,
    /// EtherType of the payload after any VLAN tags.
    pub ether_type: u16,
}

impl EthernetFrame {
    /// Parses the Ethernet header of `data`.
    ///
    /// Returns `None` when the buffer is too short for an Ethernet header or
    /// ends inside a VLAN tag.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let eth = EthernetPacket::new(data)?;

        let mut vlan = VlanId::NONE;
        let mut ether_type = eth.get_ethertype().0;
        let mut payload = eth.payload();

        for _ in 0..MAX_VLAN_TAGS {
            if !ether_types::is_vlan_tag(ether_type) {
                break;
            }
            let tag = VlanPacket::new(payload)?;
            vlan = VlanId::from_tci(tag.get_vlan_identifier());
            ether_type = tag.get_ethertype().0;
            payload = &payload[VLAN_TAG_LEN..];
        }

        Some(Self {
            destination: from_pnet(eth.get_destination()),
            source: from_pnet(eth.get_source()),
            vlan,
            ether_type,
        })
    }

    pub fn is_ipv4(&self) -> bool {
        self.ether_type == ether_types::IPV4
    }

    pub fn is_ipv6(&self) -> bool {
        self.ether_type == ether_types::IPV6
    }
}

fn from_pnet(mac: MacAddr) -> MacAddress {
    let MacAddr(a, b, c, d, e, f) = mac;
    MacAddress::new([a, b, c, d, e, f])
}

fn to_pnet(mac: MacAddress) -> MacAddr {
    let [a, b, c, d, e, f] = mac.octets();
    MacAddr::new(a, b, c, d, e, f)
}

/// Synthesises Ethernet frames for injection into a packet service.
///
/// ```
/// use ofwd_packet::{EthernetFrame, FrameBuilder};
/// use ofwd_types::{ether_types, MacAddress, VlanId};
///
/// let bytes = FrameBuilder::new(MacAddress::new([0, 0, 0, 0, 0, 1]), MacAddress::new([0, 0, 0, 0, 0, 3]))
///     .vlan(VlanId::new(10).unwrap())
///     .ether_type(ether_types::IPV6)
///     .build();
///
/// let frame = EthernetFrame::parse(&bytes).unwrap();
/// assert_eq!(frame.vlan.tag(), Some(10));
/// assert!(frame.is_ipv6());
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    source: MacAddress,
    destination: MacAddress,
    vlan: VlanId,
    ether_type: u16,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new(source: MacAddress, destination: MacAddress) -> Self {
        Self {
            source,
            destination,
            vlan: VlanId::NONE,
            ether_type: ether_types::IPV4,
            payload: Vec::new(),
        }
    }

    pub fn vlan(mut self, vlan: VlanId) -> Self {
        self.vlan = vlan;
        self
    }

    pub fn ether_type(mut self, ether_type: u16) -> Self {
        self.ether_type = ether_type;
        self
    }

    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let tag_len = if self.vlan.is_none() { 0 } else { VLAN_TAG_LEN };
        let mut buffer = vec![0u8; ETH_HDR_LEN + tag_len + self.payload.len()];

        // `buffer` is sized for the header, the optional tag and the payload.
        if let Some(mut eth) = MutableEthernetPacket::new(&mut buffer[..]) {
            eth.set_destination(to_pnet(self.destination));
            eth.set_source(to_pnet(self.source));
            match self.vlan.tag() {
                Some(_) => eth.set_ethertype(EtherType(ether_types::VLAN)),
                None => eth.set_ethertype(EtherType(self.ether_type)),
            }
        }

        if let Some(id) = self.vlan.tag() {
            if let Some(mut tag) = MutableVlanPacket::new(&mut buffer[ETH_HDR_LEN..]) {
                tag.set_vlan_identifier(id);
                tag.set_ethertype(EtherType(self.ether_type));
            }
        }

        buffer[ETH_HDR_LEN + tag_len..].copy_from_slice(&self.payload);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0, 0, 0, 0, 0, last])
    }

    #[test]
    fn test_parse_untagged_ipv4() {
        let bytes = FrameBuilder::new(mac(1), mac(2)).payload(vec![0x45; 20]).build();
        let frame = EthernetFrame::parse(&bytes).unwrap();

        assert_eq!(frame.source, mac(1));
        assert_eq!(frame.destination, mac(2));
        assert!(frame.vlan.is_none());
        assert!(frame.is_ipv4());
    }

    #[test]
    fn test_parse_single_tag() {
        let bytes = FrameBuilder::new(mac(1), mac(2))
            .vlan(VlanId::new(300).unwrap())
            .ether_type(ether_types::IPV6)
            .build();
        let frame = EthernetFrame::parse(&bytes).unwrap();

        assert_eq!(frame.vlan.tag(), Some(300));
        assert_eq!(frame.ether_type, ether_types::IPV6);
    }

    #[test]
    fn test_parse_qinq_reports_inner_vlan() {
        let mut bytes = vec![0u8; ETH_HDR_LEN + 2 * VLAN_TAG_LEN];
        bytes[..6].copy_from_slice(&mac(2).octets());
        bytes[6..12].copy_from_slice(&mac(1).octets());
        bytes[12..14].copy_from_slice(&ether_types::QINQ.to_be_bytes());
        // outer S-tag: vid 100, next C-tag
        bytes[14..16].copy_from_slice(&100u16.to_be_bytes());
        bytes[16..18].copy_from_slice(&ether_types::VLAN.to_be_bytes());
        // inner C-tag: vid 20, next IPv4
        bytes[18..20].copy_from_slice(&20u16.to_be_bytes());
        bytes[20..22].copy_from_slice(&ether_types::IPV4.to_be_bytes());

        let frame = EthernetFrame::parse(&bytes).unwrap();
        assert_eq!(frame.vlan.tag(), Some(20));
        assert!(frame.is_ipv4());
    }

    #[test]
    fn test_parse_rejects_short_buffers() {
        assert_eq!(EthernetFrame::parse(&[]), None);
        assert_eq!(EthernetFrame::parse(&[0u8; ETH_HDR_LEN - 1]), None);

        // tagged EtherType with the tag cut off
        let mut bytes = vec![0u8; ETH_HDR_LEN + 2];
        bytes[12..14].copy_from_slice(&ether_types::VLAN.to_be_bytes());
        assert_eq!(EthernetFrame::parse(&bytes), None);
    }

    #[test]
    fn test_build_layout() {
        let bytes = FrameBuilder::new(mac(1), mac(2))
            .ether_type(ether_types::ARP)
            .payload(vec![1, 2, 3])
            .build();

        assert_eq!(bytes.len(), ETH_HDR_LEN + 3);
        assert_eq!(&bytes[..6], &mac(2).octets());
        assert_eq!(&bytes[6..12], &mac(1).octets());
        assert_eq!(&bytes[12..14], &ether_types::ARP.to_be_bytes());
        assert_eq!(&bytes[14..], &[1, 2, 3]);
    }
}
