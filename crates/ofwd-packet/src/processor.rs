//! Packet processor trait and priority bands.

use crate::context::PacketContext;
use std::fmt;

/// Callback invoked by a packet service for every intercepted packet.
///
/// # Threading
///
/// The packet service calls `process` from its own worker threads. Calls for
/// different packets may overlap and arrive in any order, so implementations
/// must be `Send + Sync` and must not assume two packets of one flow are seen
/// by the same thread.
pub trait PacketProcessor: Send + Sync {
    /// Processes one packet. Implementations must not panic on malformed input.
    fn process(&self, context: &PacketContext);

    /// Name used in service logs.
    fn name(&self) -> &str {
        "processor"
    }
}

/// Position of a processor in the dispatch chain (lower runs first).
///
/// Values are grouped in three bands. Advisors only observe and annotate,
/// directors may take ownership of a packet, observers see whatever is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorPriority(i32);

impl ProcessorPriority {
    /// Upper bound of the advisor band.
    pub const ADVISOR_MAX: i32 = i32::MAX / 3;

    /// Upper bound of the director band.
    pub const DIRECTOR_MAX: i32 = (i32::MAX / 3) * 2;

    pub const fn advisor(priority: i32) -> Self {
        ProcessorPriority(priority)
    }

    /// Unchecked: `priority` must fit inside the director band.
    pub const fn director(priority: i32) -> Self {
        ProcessorPriority(Self::ADVISOR_MAX + priority)
    }

    pub const fn observer(priority: i32) -> Self {
        ProcessorPriority(Self::DIRECTOR_MAX + priority)
    }

    /// Director priority at `offset`, or `None` if that lands outside the director band.
    pub fn checked_director(offset: i32) -> Option<Self> {
        let width = Self::DIRECTOR_MAX - Self::ADVISOR_MAX;
        (0..width)
            .contains(&offset)
            .then(|| ProcessorPriority(Self::ADVISOR_MAX + offset))
    }
}

impl fmt::Display for ProcessorPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (band, offset) = if self.0 < Self::ADVISOR_MAX {
            ("advisor", self.0)
        } else if self.0 < Self::DIRECTOR_MAX {
            ("director", self.0 - Self::ADVISOR_MAX)
        } else {
            ("observer", self.0 - Self::DIRECTOR_MAX)
        };
        write!(f, "{band}({offset})")
    }
}
