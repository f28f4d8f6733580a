//! VLAN ID type.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IEEE 802.1Q VLAN identifier as seen on an intercepted frame.
///
/// Frames without an 802.1Q tag carry [`VlanId::NONE`]. Tagged frames carry
/// the 12-bit identifier from the tag (0-4095); the reserved values are kept
/// as-is because host lookups must use exactly what was on the wire.
///
/// ```
/// use ofwd_types::VlanId;
///
/// assert_eq!(VlanId::NONE.to_string(), "None");
/// assert_eq!(VlanId::new(100).unwrap().to_string(), "100");
/// assert!(VlanId::new(4096).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VlanId(u16);

impl VlanId {
    /// Largest identifier representable in an 802.1Q tag.
    pub const MAX: u16 = 4095;

    /// Untagged traffic.
    pub const NONE: VlanId = VlanId(u16::MAX);

    pub fn new(id: u16) -> Result<Self, ParseError> {
        if id <= Self::MAX {
            Ok(VlanId(id))
        } else {
            Err(ParseError::InvalidVlanId(id.to_string()))
        }
    }

    /// Builds the id from the TCI field of an 802.1Q tag (PCP/DEI bits are dropped).
    pub const fn from_tci(tci: u16) -> Self {
        VlanId(tci & 0x0fff)
    }

    pub const fn is_none(&self) -> bool {
        self.0 == u16::MAX
    }

    /// Returns the tag value, or `None` for untagged traffic.
    pub const fn tag(&self) -> Option<u16> {
        if self.is_none() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl Default for VlanId {
    fn default() -> Self {
        VlanId::NONE
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("None"),
        }
    }
}

impl FromStr for VlanId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(VlanId::NONE);
        }

        let digits = match s.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("vlan") => &s[4..],
            _ => s,
        };

        let id: u16 = digits
            .parse()
            .map_err(|_| ParseError::InvalidVlanId(s.to_string()))?;
        VlanId::new(id)
    }
}

impl TryFrom<String> for VlanId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VlanId> for String {
    fn from(vlan: VlanId) -> String {
        vlan.to_string()
    }
}
