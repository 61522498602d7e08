//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → config file (TOML, optional)       loader.rs
//!     → env file (.env, dotenv syntax)     loader.rs
//!     → process environment (HTTP_HOST, HTTP_PORT)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → memoized by the service provider, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Bind address has no default: a missing host or port is fatal
//! - Validation separates syntactic (serde) from semantic checks
//! - Log settings live outside ServiceConfig and come from the command line

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_from, ConfigError, ConfigSources};
pub use schema::{HttpConfig, ServerConfig, ServiceConfig, ShutdownConfig};
