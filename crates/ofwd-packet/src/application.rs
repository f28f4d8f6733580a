//! Application identity registration.

use crate::error::PacketResult;
use std::fmt;
use std::sync::Arc;

/// Identity under which an application holds intercepts and flow state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationId {
    id: u16,
    name: Arc<str>,
}

impl ApplicationId {
    pub fn new(id: u16, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}

/// Controller core services needed by applications.
pub trait CoreService: Send + Sync {
    /// Registers (or looks up) the application called `name`.
    ///
    /// Registering the same name twice yields the same id.
    fn register_application(&self, name: &str) -> PacketResult<ApplicationId>;
}
