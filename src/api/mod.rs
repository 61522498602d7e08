//! Controller seam between HTTP routing and download logic.
//!
//! # Data Flow
//! ```text
//! routing/router.rs
//!     → RequestContext (request id, cancellation via future drop)
//!     → dyn Controller::download
//!     → Response written back by the router
//! ```
//!
//! # Design Decisions
//! - The router only ever sees `dyn Controller`, so a real download engine
//!   can replace the stub without touching routing or lifecycle code
//! - Controllers report every outcome through the response they return

pub mod controller;

pub use controller::{Controller, DownloadController, RequestContext};
