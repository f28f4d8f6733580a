//! Agent configuration.
//!
//! Every field has a compiled-in default; the defaults alone reproduce the
//! relay's fixed behaviour (application name, director priority 2, delivery
//! to `http://0.0.0.0:7000`). A TOML file may override any subset:
//!
//! ```toml
//! [application]
//! name = "ir.ac.ut.outsourcedforwarding"
//! processor_priority = 2
//!
//! [delivery]
//! endpoint = "http://0.0.0.0:7000"
//! connect_timeout_ms = 1000
//! request_timeout_ms = 3000
//! mode = "inline"          # or "queued"
//! workers = 2
//! queue_capacity = 256
//! shutdown_grace_ms = 5000
//! ```

use crate::error::ConfigError;
use ofwd_packet::ProcessorPriority;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Application identity and processor placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Name registered with the core service
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Offset inside the director band
    #[serde(default = "default_processor_priority")]
    pub processor_priority: i32,
}

/// How payloads leave the packet thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStrategy {
    /// POST on the packet-processing thread.
    #[default]
    Inline,
    /// Hand off to a bounded worker pool.
    Queued,
}

/// Outbound delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// URL receiving the POSTed payloads
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// TCP connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub mode: DeliveryStrategy,

    /// Worker threads (queued mode only)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Pending payloads before new ones are dropped (queued mode only)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Time a stopping queue keeps delivering its backlog (queued mode only)
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_ms: u64,
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,
}

fn default_app_name() -> String {
    "ir.ac.ut.outsourcedforwarding".to_string()
}

fn default_processor_priority() -> i32 {
    2
}

fn default_endpoint() -> String {
    "http://0.0.0.0:7000".to_string()
}

fn default_connect_timeout() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    3000
}

fn default_workers() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    256
}

fn default_shutdown_grace() -> u64 {
    5000
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            processor_priority: default_processor_priority(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            mode: DeliveryStrategy::default(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            shutdown_grace_ms: default_shutdown_grace(),
        }
    }
}

impl ApplicationConfig {
    /// Director-band priority for `processor_priority`.
    pub fn priority(&self) -> Result<ProcessorPriority, ConfigError> {
        ProcessorPriority::checked_director(self.processor_priority).ok_or_else(|| {
            ConfigError::invalid(
                "application.processor_priority",
                format!(
                    "{} must be in 0..{}",
                    self.processor_priority,
                    ProcessorPriority::DIRECTOR_MAX - ProcessorPriority::ADVISOR_MAX
                ),
            )
        })
    }
}

impl DeliveryConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Parsed endpoint URL; only `http` and `https` are accepted.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::invalid("delivery.endpoint", format!("{}: {e}", self.endpoint)))?;
        match url.scheme() {
            "http" | "https" if url.host().is_some() => Ok(url),
            _ => Err(ConfigError::invalid(
                "delivery.endpoint",
                format!("{} is not an http(s) URL with a host", self.endpoint),
            )),
        }
    }
}

impl AgentConfig {
    /// Parses a configuration document.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from `path`. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Loads configuration from `path`, falling back to defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application.name.trim().is_empty() {
            return Err(ConfigError::invalid("application.name", "must not be empty"));
        }

        self.application.priority()?;

        self.delivery.endpoint_url()?;

        if self.delivery.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid("delivery.connect_timeout_ms", "must be > 0"));
        }
        if self.delivery.request_timeout_ms == 0 {
            return Err(ConfigError::invalid("delivery.request_timeout_ms", "must be > 0"));
        }

        if self.delivery.mode == DeliveryStrategy::Queued {
            if self.delivery.workers == 0 {
                return Err(ConfigError::invalid("delivery.workers", "must be > 0"));
            }
            if self.delivery.queue_capacity == 0 {
                return Err(ConfigError::invalid("delivery.queue_capacity", "must be > 0"));
            }
        }

        Ok(())
    }
}
