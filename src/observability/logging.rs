//! Structured logging.
//!
//! # Responsibilities
//! - Build the logging pipeline from an explicit `LogConfig`
//! - Fan every record out to a console sink and a rotating JSON file sink
//! - Gate both sinks with one severity threshold
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Pretty format for the console, JSON for the file
//! - The file sink runs on a non-blocking worker, so a slow or broken
//!   disk never stalls a request handler
//! - The threshold is a registry-level filter, not a per-layer one

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;

use crate::observability::rotating_file::{RotatingFile, RotationPolicy};

/// Default location of the rotating log file.
pub const DEFAULT_LOG_FILE: &str = "logs/downloader.log";

/// Severity threshold accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Logging settings, resolved before the service provider is built.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Threshold shared by both sinks.
    pub level: LogLevel,
    /// Active file of the rotating sink.
    pub file: PathBuf,
    /// Size, age and count limits of the rotating sink.
    pub rotation: RotationPolicy,
    /// Colourise console output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file: PathBuf::from(DEFAULT_LOG_FILE),
            rotation: RotationPolicy::default(),
            ansi: std::io::stdout().is_terminal(),
        }
    }
}

/// Shared handle to the logging pipeline.
///
/// Dropping the handle flushes records still queued for the file sink.
pub struct LoggerHandle {
    dispatch: Dispatch,
    level: LevelFilter,
    _file_guard: WorkerGuard,
}

impl LoggerHandle {
    /// Build the console + rotating file pipeline.
    pub fn new(config: &LogConfig) -> Self {
        let file = RotatingFile::new(config.file.clone(), config.rotation.clone());
        let (file_writer, guard) = tracing_appender::non_blocking(file);
        let level = LevelFilter::from(config.level);

        Self {
            dispatch: build_dispatch(level, config.ansi, std::io::stdout, file_writer),
            level,
            _file_guard: guard,
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Make this pipeline the process-wide default.
    ///
    /// Returns `false` when another subscriber was installed first.
    pub fn install(&self) -> bool {
        match tracing::dispatcher::set_global_default(self.dispatch.clone()) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Global logger already installed, keeping existing one");
                false
            }
        }
    }
}

impl std::fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Assemble a dispatcher writing human-readable lines to `console` and JSON
/// records to `file`, both filtered by `level`.
pub fn build_dispatch<C, F>(level: LevelFilter, ansi: bool, console: C, file: F) -> Dispatch
where
    C: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(false)
        .with_writer(console);

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(file);

    let subscriber = tracing_subscriber::registry()
        .with(level)
        .with(console_layer)
        .with(file_layer);

    Dispatch::new(subscriber)
}
