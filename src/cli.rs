//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::ConfigSources;
use crate::observability::logging::DEFAULT_LOG_FILE;
use crate::observability::{LogConfig, LogLevel, RotationPolicy};

const MIB: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Parser)]
#[command(name = "file-downloader")]
#[command(version, about = "HTTP file download service", long_about = None)]
pub struct Cli {
    /// Log threshold for both console and file output.
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Env file with HTTP_HOST / HTTP_PORT. Defaults to ./.env when present.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// TOML file with [http], [server] and [shutdown] sections.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Active file of the rotating log.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Rotate the log file once it would exceed this many MiB.
    #[arg(long, default_value_t = 10)]
    pub log_max_size_mb: u64,

    /// Delete rotated log files older than this many days (0 keeps all).
    #[arg(long, default_value_t = 7)]
    pub log_max_age_days: u64,

    /// Number of rotated log files to keep (0 keeps all).
    #[arg(long, default_value_t = 3)]
    pub log_max_backups: usize,
}

impl Cli {
    pub fn config_sources(&self) -> ConfigSources {
        ConfigSources {
            config_file: self.config.clone(),
            env_file: self.env_file.clone(),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level,
            file: self.log_file.clone(),
            rotation: RotationPolicy {
                max_size: self.log_max_size_mb.saturating_mul(MIB),
                max_age: DAY.saturating_mul(u32::try_from(self.log_max_age_days).unwrap_or(u32::MAX)),
                max_backups: self.log_max_backups,
            },
            ..LogConfig::default()
        }
    }
}
