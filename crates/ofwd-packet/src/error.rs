//! Error types for the packet interception boundary.

use thiserror::Error;

/// Result type alias for packet service operations.
pub type PacketResult<T> = Result<T, PacketError>;

/// Errors reported by a packet or core service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// The selector does not constrain anything the service can intercept on.
    #[error("Invalid traffic selector: {reason}")]
    InvalidSelector {
        /// Why the selector was rejected.
        reason: String,
    },

    /// The application name is not acceptable to the core service.
    #[error("Invalid application name: {name:?}")]
    InvalidApplication {
        /// The rejected name.
        name: String,
    },

    /// The underlying interception subsystem is not available.
    #[error("Packet service unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

impl PacketError {
    /// Creates an invalid selector error.
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable service error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
