//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the loader handle syntax)
//! - Validate value ranges (timeouts > 0, header limit, connection cap)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// Smallest header buffer hyper accepts.
pub const MIN_HEADER_BYTES: usize = 8192;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("http host must not be empty")]
    EmptyHost,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("server.max_header_bytes must be at least {min}, got {0}", min = MIN_HEADER_BYTES)]
    HeaderLimitTooSmall(usize),
}

/// Check a resolved configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let server = &config.server;
    if server.read_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.read_timeout_secs",
        });
    }
    if server.write_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "server.write_timeout_secs",
        });
    }
    if server.max_connections == 0 {
        errors.push(ValidationError::Zero {
            field: "server.max_connections",
        });
    }
    if server.max_header_bytes < MIN_HEADER_BYTES {
        errors.push(ValidationError::HeaderLimitTooSmall(server.max_header_bytes));
    }

    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "shutdown.grace_period_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
