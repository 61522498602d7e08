//! Configuration schema definitions.
//!
//! `FileConfig` mirrors the optional TOML file (every field optional or
//! defaulted). `ServiceConfig` is the resolved, validated value handed out by
//! the service provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resolved configuration for the download service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to.
    pub http: HttpConfig,

    /// Listener tuning (timeouts, header limit, connection cap).
    pub server: ServerConfig,

    /// Graceful shutdown bound.
    pub shutdown: ShutdownConfig,
}

impl ServiceConfig {
    /// Bind address in `host:port` form.
    pub fn address(&self) -> String {
        self.http.address()
    }
}

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Time allowed for a client to send the request head, in seconds.
    pub read_timeout_secs: u64,

    /// Time allowed for a handler to produce its response, in seconds.
    pub write_timeout_secs: u64,

    /// Upper bound on buffered request-head bytes.
    pub max_header_bytes: usize,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            max_header_bytes: 1 << 20,
            max_connections: 10_000,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time in-flight connections get to finish once a signal arrives.
    pub grace_period_secs: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 60,
        }
    }
}

/// Shape of the optional TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub http: FileHttpConfig,
    pub server: ServerConfig,
    pub shutdown: ShutdownConfig,
}

/// `[http]` section; the environment may fill in whatever is missing here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileHttpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}
