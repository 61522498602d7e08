//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (axum route table)
//!     → POST /files/download        → Controller::download
//!     → POST /files/batch/download  → placeholder, no controller call
//!     → anything else               → 404 / 405
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - The controller is the only state the routes carry

pub mod router;

pub use router::{build_router, BATCH_DOWNLOAD_PATH, DOWNLOAD_PATH};
