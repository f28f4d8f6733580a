//! Line-oriented payload sent to the decision service.
//!
//! ```text
//! <src device>\n
//! <dst device>\n
//! <vertex>|<vertex>|...|\n
//! <src>-<dst>|<src>-<dst>|...|
//! ```
//!
//! Every list item is followed by `|`, the last one included. An empty list
//! is an empty line. Nothing follows the fourth line.

use crate::error::PayloadError;
use crate::snapshot::TopologySnapshot;
use ofwd_types::DeviceId;
use std::fmt;

const LINE_COUNT: usize = 4;
const ITEM_SEPARATOR: char = '|';
const EDGE_SEPARATOR: char = '-';

/// Event endpoints plus the topology snapshot taken for the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPayload {
    src: DeviceId,
    dst: DeviceId,
    snapshot: TopologySnapshot,
}

impl DeliveryPayload {
    pub fn new(src: DeviceId, dst: DeviceId, snapshot: TopologySnapshot) -> Self {
        Self { src, dst, snapshot }
    }

    pub fn src(&self) -> &DeviceId {
        &self.src
    }

    pub fn dst(&self) -> &DeviceId {
        &self.dst
    }

    pub fn snapshot(&self) -> &TopologySnapshot {
        &self.snapshot
    }

    /// Renders the wire form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses the wire form back into its tokens.
    pub fn decode(content: &str) -> Result<DecodedPayload, PayloadError> {
        let lines: Vec<&str> = content.split('\n').collect();
        if lines.len() != LINE_COUNT {
            return Err(PayloadError::LineCount { found: lines.len() });
        }

        let device = |line: usize| -> Result<String, PayloadError> {
            match lines[line - 1] {
                "" => Err(PayloadError::EmptyDevice { line }),
                id => Ok(id.to_string()),
            }
        };
        let src = device(1)?;
        let dst = device(2)?;

        let vertices = split_list(lines[2], 3)?;
        let edges = split_list(lines[3], 4)?;
        for edge in &edges {
            match edge.split_once(EDGE_SEPARATOR) {
                Some((s, d)) if !s.is_empty() && !d.is_empty() => {}
                _ => {
                    return Err(PayloadError::MalformedEdge {
                        line: 4,
                        edge: edge.clone(),
                    })
                }
            }
        }

        Ok(DecodedPayload {
            src,
            dst,
            vertices,
            edges,
        })
    }
}

impl fmt::Display for DeliveryPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.src)?;
        writeln!(f, "{}", self.dst)?;
        for vertex in self.snapshot.vertices() {
            write!(f, "{vertex}{ITEM_SEPARATOR}")?;
        }
        writeln!(f)?;
        for edge in self.snapshot.edges() {
            write!(f, "{}{EDGE_SEPARATOR}{}{ITEM_SEPARATOR}", edge.src, edge.dst)?;
        }
        Ok(())
    }
}

fn split_list(line: &str, number: usize) -> Result<Vec<String>, PayloadError> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let body = line
        .strip_suffix(ITEM_SEPARATOR)
        .ok_or(PayloadError::Unterminated { line: number })?;

    body.split(ITEM_SEPARATOR)
        .map(|item| {
            if item.is_empty() {
                Err(PayloadError::EmptyItem { line: number })
            } else {
                Ok(item.to_string())
            }
        })
        .collect()
}

/// Tokens recovered from a wire payload.
///
/// Edges are kept as `<src>-<dst>` strings: device ids may themselves contain
/// `-`, so the split point is not recoverable from the text alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub src: String,
    pub dst: String,
    pub vertices: Vec<String>,
    pub edges: Vec<String>,
}
