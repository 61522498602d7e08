//! Process lifecycle: startup, serving and bounded graceful shutdown.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::config::{ConfigError, ServiceConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::container::ServiceProvider;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::{self, ShutdownSignal};

/// Failures that end the process with a non-zero status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("http server error: {0}")]
    Server(#[from] ServerError),

    #[error("http server stopped unexpectedly")]
    ServerStopped,

    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[source] io::Error),
}

/// Lifecycle phases, entered strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Serving,
    ShuttingDown,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Initializing => "initializing",
            Phase::Serving => "serving",
            Phase::ShuttingDown => "shutting_down",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How the shutdown attempt ended. None of these change the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection finished within the grace period.
    Graceful,
    /// The grace period elapsed; remaining connections were closed.
    TimedOut,
    /// The server reported an error while draining.
    Failed,
}

/// The assembled service, ready to serve.
pub struct App {
    config: Arc<ServiceConfig>,
    server: HttpServer,
    bound: watch::Sender<Option<SocketAddr>>,
}

impl App {
    /// Resolve dependencies and build the HTTP server.
    ///
    /// Installs the provider's logger as the global subscriber first, so
    /// configuration failures are logged through it.
    pub fn new(provider: &ServiceProvider) -> Result<Self, AppError> {
        provider.logger().install();
        enter(Phase::Initializing);

        let config = provider.config().inspect_err(|e| {
            tracing::error!(error = %e, "Failed to load configuration");
        })?;

        tracing::info!(
            address = %config.address(),
            read_timeout_secs = config.server.read_timeout_secs,
            write_timeout_secs = config.server.write_timeout_secs,
            max_header_bytes = config.server.max_header_bytes,
            max_connections = config.server.max_connections,
            "Configuration loaded"
        );

        let server = HttpServer::new(&config, provider.controller());
        let (bound, _) = watch::channel(None);

        Ok(Self {
            config,
            server,
            bound,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Watch that holds the listener's local address once it is bound.
    pub fn listening(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.bound.subscribe()
    }

    /// Serve until SIGINT or SIGTERM, then shut down.
    pub async fn run(self) -> Result<ShutdownOutcome, AppError> {
        self.run_until(signals::termination()).await
    }

    /// Serve until `signal` resolves, then shut down.
    ///
    /// Returns `Err` only for fatal conditions: the listener failing while
    /// serving, or signal handlers that cannot be installed.
    pub async fn run_until<F>(self, signal: F) -> Result<ShutdownOutcome, AppError>
    where
        F: Future<Output = io::Result<ShutdownSignal>>,
    {
        let App {
            config,
            server,
            bound,
        } = self;

        let shutdown = Shutdown::new();
        let connections = server.connections();
        let (fatal_tx, mut fatal_rx) = mpsc::channel::<ServerError>(1);

        let server_rx = shutdown.subscribe();
        let mut server_task = tokio::spawn(async move {
            if let Err(e) = server.run(server_rx, bound).await {
                let _ = fatal_tx.send(e).await;
            }
        });

        enter(Phase::Serving);

        tokio::select! {
            received = signal => match received {
                Ok(signal) => tracing::info!(signal = %signal, "Shutdown signal received"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for shutdown signals");
                    server_task.abort();
                    enter(Phase::Terminated);
                    return Err(AppError::Signal(e));
                }
            },
            fatal = fatal_rx.recv() => {
                let err = match fatal {
                    Some(e) => AppError::Server(e),
                    None => AppError::ServerStopped,
                };
                tracing::error!(error = %err, "HTTP server failed");
                enter(Phase::Terminated);
                return Err(err);
            }
        }

        enter(Phase::ShuttingDown);
        let grace = config.shutdown.grace_period();
        tracing::info!(
            grace_period_secs = grace.as_secs(),
            in_flight = connections.active_count(),
            "Shutting down HTTP server"
        );
        shutdown.trigger();

        let outcome = match tokio::time::timeout(grace, &mut server_task).await {
            Ok(Ok(())) => match fatal_rx.try_recv() {
                Ok(e) => {
                    tracing::error!(error = %e, "Failed shutting down HTTP server");
                    ShutdownOutcome::Failed
                }
                Err(_) => ShutdownOutcome::Graceful,
            },
            Ok(Err(e)) => {
                tracing::error!(error = %e, "HTTP server task failed during shutdown");
                ShutdownOutcome::Failed
            }
            Err(_) => {
                tracing::error!(
                    grace_period_secs = grace.as_secs(),
                    remaining = connections.active_count(),
                    "Graceful shutdown timed out, closing remaining connections"
                );
                server_task.abort();
                let _ = server_task.await;
                ShutdownOutcome::TimedOut
            }
        };

        enter(Phase::Terminated);
        Ok(outcome)
    }
}

fn enter(phase: Phase) {
    tracing::info!(phase = %phase, "Lifecycle phase");
}
