//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Initializing (app.rs):
//!     ServiceProvider → logger → config → router + HttpServer
//!
//! Serving (app.rs):
//!     background task: HttpServer::run (accept loop)
//!     main task: wait for signals.rs OR fatal server error
//!
//! ShuttingDown (app.rs, shutdown.rs):
//!     trigger → stop accepting → drain connections (bounded) → abort rest
//!
//! Terminated:
//!     return outcome; main maps it to an exit code
//! ```
//!
//! # Design Decisions
//! - Ordered startup: logger and config first, listener last
//! - Fail fast: any startup error is fatal
//! - Fatal server errors travel over a channel to the main task, which
//!   alone decides to exit
//! - Shutdown has timeout: remaining connections are force-closed after it

pub mod app;
pub mod container;
pub mod shutdown;
pub mod signals;

pub use app::{App, AppError, Phase, ShutdownOutcome};
pub use container::ServiceProvider;
pub use shutdown::Shutdown;
pub use signals::ShutdownSignal;
