//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::dispatcher::DefaultGuard;

use file_downloader::api::{Controller, RequestContext};
use file_downloader::config::{HttpConfig, ServerConfig, ServiceConfig, ShutdownConfig};
use file_downloader::lifecycle::ShutdownSignal;
use file_downloader::observability::{LogConfig, LogLevel, RotationPolicy};
use file_downloader::{App, AppError, ServiceProvider, ShutdownOutcome};

/// Config bound to an ephemeral localhost port.
pub fn local_config(grace_period_secs: u64) -> ServiceConfig {
    ServiceConfig {
        http: HttpConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        server: ServerConfig::default(),
        shutdown: ShutdownConfig { grace_period_secs },
    }
}

pub fn log_config(dir: &tempfile::TempDir) -> LogConfig {
    LogConfig {
        level: LogLevel::Debug,
        file: dir.path().join("downloader.log"),
        rotation: RotationPolicy::default(),
        ansi: false,
    }
}

pub fn provider(config: ServiceConfig, logs: &tempfile::TempDir) -> ServiceProvider {
    ServiceProvider::with_config_loader(move || Ok(config.clone()), log_config(logs))
}

/// A running service driven by a test instead of OS signals.
pub struct TestService {
    pub addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<ShutdownOutcome, AppError>>,
    log_scope: DefaultGuard,
    provider: ServiceProvider,
    logs: tempfile::TempDir,
}

impl TestService {
    /// Start with the default controller.
    pub async fn start(config: ServiceConfig) -> Self {
        let logs = tempfile::tempdir().unwrap();
        let provider = provider(config, &logs);
        Self::launch(provider, logs).await
    }

    /// Start with `controller` behind the routes.
    pub async fn start_with(config: ServiceConfig, controller: Arc<dyn Controller>) -> Self {
        let logs = tempfile::tempdir().unwrap();
        let provider = provider(config, &logs).with_controller(controller);
        Self::launch(provider, logs).await
    }

    async fn launch(provider: ServiceProvider, logs: tempfile::TempDir) -> Self {
        // Tests run on a current-thread runtime, so this covers every task the
        // service spawns and routes its records to this service's own files.
        let log_scope = tracing::dispatcher::set_default(provider.logger().dispatch());
        let app = App::new(&provider).expect("app should initialize");
        let mut listening = app.listening();

        let (stop, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(app.run_until(async move {
            let _ = stop_rx.await;
            Ok(ShutdownSignal::Interrupt)
        }));

        let addr = loop {
            let current = *listening.borrow_and_update();
            if let Some(addr) = current {
                break addr;
            }
            listening.changed().await.expect("server exited before binding");
        };

        Self {
            addr,
            stop: Some(stop),
            handle,
            log_scope,
            provider,
            logs,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Deliver the simulated termination signal.
    pub fn signal(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Signal (if not done yet) and wait for the lifecycle to finish.
    pub async fn finish(self) -> Result<ShutdownOutcome, AppError> {
        self.finish_with_log().await.0
    }

    /// Like [`TestService::finish`], also returning the flushed file log.
    pub async fn finish_with_log(mut self) -> (Result<ShutdownOutcome, AppError>, String) {
        self.signal();
        let outcome = tokio::time::timeout(Duration::from_secs(10), &mut self.handle)
            .await
            .expect("shutdown should finish")
            .expect("lifecycle task should not panic");

        let log_file = self.logs.path().join("downloader.log");
        let TestService {
            log_scope,
            provider,
            logs,
            ..
        } = self;
        drop(log_scope);
        // Dropping the provider flushes the non-blocking file writer.
        drop(provider);
        let log = std::fs::read_to_string(&log_file).unwrap_or_default();
        drop(logs);

        (outcome, log)
    }
}

/// HTTP client without pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Controller that sleeps before answering and counts calls.
pub struct SlowController {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowController {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Controller for SlowController {
    async fn download(&self, _ctx: RequestContext, _request: Request<Body>) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        "slow".into_response()
    }
}
