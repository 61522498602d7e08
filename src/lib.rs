//! HTTP file download service.
//!
//! # Architecture Overview
//!
//! ```text
//!   main.rs ──▶ lifecycle::App ──▶ lifecycle::ServiceProvider
//!                    │                 ├── config        (ServiceConfig)
//!                    │                 ├── observability (LoggerHandle)
//!                    │                 └── api           (dyn Controller)
//!                    ▼
//!              http::HttpServer ──▶ net::Listener
//!                    │
//!                    ▼
//!              routing::router ──▶ api::Controller::download
//! ```

// Core subsystems
pub mod api;
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod cli;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{App, AppError, ServiceProvider, ShutdownOutcome};
