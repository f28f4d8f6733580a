//! EtherType values the relay matches on or has to step over while parsing.

/// Internet Protocol version 4.
pub const IPV4: u16 = 0x0800;

/// Address Resolution Protocol.
pub const ARP: u16 = 0x0806;

/// IEEE 802.1Q customer VLAN tag.
pub const VLAN: u16 = 0x8100;

/// Internet Protocol version 6.
pub const IPV6: u16 = 0x86dd;

/// IEEE 802.1ad service VLAN tag (QinQ outer tag).
pub const QINQ: u16 = 0x88a8;

/// Returns true for the tag protocol identifiers that introduce a VLAN tag.
pub const fn is_vlan_tag(ether_type: u16) -> bool {
    ether_type == VLAN || ether_type == QINQ
}
