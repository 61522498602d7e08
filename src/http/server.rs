//! HTTP server setup and connection serving.
//!
//! # Responsibilities
//! - Bind the listener and run the accept loop
//! - Serve each connection on its own task (HTTP/1.1)
//! - Apply read timeout and header size limit per connection
//! - On shutdown: stop accepting, ask every connection to finish its
//!   in-flight request, then wait for them
//!
//! # Design Decisions
//! - Connection tasks live in a `JoinSet`: aborting the server task drops
//!   the set, which force-closes whatever is still open
//! - The bound address is published on a watch channel so callers can use
//!   port 0
//! - Only non-transient accept errors end the server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::api::Controller;
use crate::config::{ServerConfig, ServiceConfig};
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::routing::build_router;

/// Fatal failures of the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// The HTTP listener together with its routes and limits.
pub struct HttpServer {
    router: Router,
    address: String,
    config: ServerConfig,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig, controller: Arc<dyn Controller>) -> Self {
        Self {
            router: build_router(controller, &config.server),
            address: config.address(),
            config: config.server.clone(),
            connections: ConnectionTracker::new(),
        }
    }

    /// Handle on the open-connection count.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    /// HTTP/1.1 only: the header timeout and buffer cap have no HTTP/2 counterpart.
    fn connection_builder(&self) -> Builder<TokioExecutor> {
        let mut builder = Builder::new(TokioExecutor::new()).http1_only();
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout())
            .max_buf_size(self.config.max_header_bytes);
        builder
    }

    /// Bind and serve until `shutdown` flips to `true`, then drain.
    ///
    /// The local address is sent on `bound` once the listener is ready.
    pub async fn run(
        self,
        mut shutdown: watch::Receiver<bool>,
        bound: watch::Sender<Option<SocketAddr>>,
    ) -> Result<(), ServerError> {
        let listener = Listener::bind(&self.address, self.config.max_connections).await?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        bound.send_replace(Some(local_addr));

        tracing::info!(address = %local_addr, "HTTP server starting");

        let builder = self.connection_builder();
        let mut tasks = JoinSet::new();

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_exit(finished);
                }
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) if e.is_transient() => {
                            tracing::debug!(error = %e, "Transient accept error");
                            continue;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Listener failed");
                            return Err(e.into());
                        }
                    };

                    tasks.spawn(serve_connection(
                        builder.clone(),
                        self.router.clone(),
                        stream,
                        peer,
                        permit,
                        self.connections.track(),
                        shutdown.clone(),
                    ));
                }
            }
        }

        drop(listener);
        tracing::info!(
            in_flight = self.connections.active_count(),
            "Stopped accepting connections, draining"
        );

        while let Some(finished) = tasks.join_next().await {
            log_task_exit(finished);
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_connection(
    builder: Builder<TokioExecutor>,
    router: Router,
    stream: TcpStream,
    peer: SocketAddr,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
    mut shutdown: watch::Receiver<bool>,
) {
    let service = TowerToHyperService::new(router);
    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut draining = *shutdown.borrow_and_update();
    if draining {
        conn.as_mut().graceful_shutdown();
    }

    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(
                        connection_id = %guard.id(),
                        peer_addr = %peer,
                        error = %e,
                        "Connection ended with error"
                    );
                }
                break;
            }
            _ = shutdown.changed(), if !draining => {
                draining = true;
                tracing::trace!(connection_id = %guard.id(), "Draining connection");
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

fn log_task_exit(finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        if e.is_panic() {
            tracing::error!(error = %e, "Connection task panicked");
        }
    }
}
