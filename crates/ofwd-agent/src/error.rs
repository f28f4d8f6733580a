//! Error types for the forwarding relay.

use ofwd_packet::PacketError;
use ofwd_types::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors that can occur while setting up or tearing down the relay.
///
/// Per-event processing never produces one of these: ineligible events,
/// unknown hosts and failed deliveries are all handled where they occur.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Packet service error: {0}")]
    Packet(#[from] PacketError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Failed to build delivery client: {0}")]
    DeliverySetup(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn scenario(message: impl Into<String>) -> Self {
        AgentError::Scenario(message.into())
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised when decoding the textual delivery payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Expected 4 lines, found {found}")]
    LineCount { found: usize },

    #[error("Line {line}: device id is empty")]
    EmptyDevice { line: usize },

    #[error("Line {line}: list is not terminated by '|'")]
    Unterminated { line: usize },

    #[error("Line {line}: empty list item")]
    EmptyItem { line: usize },

    #[error("Line {line}: edge {edge:?} is not of the form <src>-<dst>")]
    MalformedEdge { line: usize, edge: String },
}
