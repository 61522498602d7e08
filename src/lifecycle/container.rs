//! Service provider: lazily built, shared service instances.
//!
//! # Responsibilities
//! - Hand out the configuration, logger and controller singletons
//! - Build each one on first request and memoize it
//!
//! # Design Decisions
//! - Every slot is a `OnceCell`: concurrent first callers block until the
//!   single initializer finishes, so nothing is built twice
//! - A failed configuration load leaves the slot empty; callers treat the
//!   error as fatal
//! - Log settings are passed in explicitly rather than read from globals

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::api::{Controller, DownloadController};
use crate::config::{load_config, ConfigError, ConfigSources, ServiceConfig};
use crate::observability::{LogConfig, LoggerHandle};

type ConfigLoader = Box<dyn Fn() -> Result<ServiceConfig, ConfigError> + Send + Sync>;

/// Lazy-singleton registry for the service's shared dependencies.
pub struct ServiceProvider {
    load_config: ConfigLoader,
    log_config: LogConfig,
    config: OnceCell<Arc<ServiceConfig>>,
    logger: OnceCell<LoggerHandle>,
    controller: OnceCell<Arc<dyn Controller>>,
}

impl ServiceProvider {
    /// Provider reading configuration from `sources` and the process environment.
    pub fn new(sources: ConfigSources, log_config: LogConfig) -> Self {
        Self::with_config_loader(move || load_config(&sources), log_config)
    }

    /// Provider using a custom configuration loader.
    pub fn with_config_loader<F>(loader: F, log_config: LogConfig) -> Self
    where
        F: Fn() -> Result<ServiceConfig, ConfigError> + Send + Sync + 'static,
    {
        Self {
            load_config: Box::new(loader),
            log_config,
            config: OnceCell::new(),
            logger: OnceCell::new(),
            controller: OnceCell::new(),
        }
    }

    /// Use `controller` instead of the default one.
    ///
    /// Has no effect once the controller has been handed out.
    pub fn with_controller(self, controller: Arc<dyn Controller>) -> Self {
        let _ = self.controller.set(controller);
        self
    }

    /// The service configuration, loaded on first call.
    pub fn config(&self) -> Result<Arc<ServiceConfig>, ConfigError> {
        self.config
            .get_or_try_init(|| (self.load_config)().map(Arc::new))
            .cloned()
    }

    /// The logging pipeline, built on first call.
    pub fn logger(&self) -> &LoggerHandle {
        self.logger.get_or_init(|| LoggerHandle::new(&self.log_config))
    }

    /// The controller serving the HTTP routes.
    pub fn controller(&self) -> Arc<dyn Controller> {
        self.controller
            .get_or_init(|| Arc::new(DownloadController::new()) as Arc<dyn Controller>)
            .clone()
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("config", &self.config.get())
            .field("logger", &self.logger.get())
            .field("controller_ready", &self.controller.get().is_some())
            .finish_non_exhaustive()
    }
}
