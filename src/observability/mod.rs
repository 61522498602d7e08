//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events
//!     → LevelFilter (single threshold)
//!         → console layer (human-readable, coloured)
//!         → JSON layer → non_blocking worker → rotating_file.rs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing, text for humans
//! - One call site per record; the subscriber multiplexes
//! - File I/O happens off the request path

pub mod logging;
pub mod rotating_file;

pub use logging::{build_dispatch, LogConfig, LogLevel, LoggerHandle};
pub use rotating_file::{RotatingFile, RotationPolicy};
