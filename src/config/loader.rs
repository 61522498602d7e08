//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{FileConfig, HttpConfig, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the bind host.
pub const HTTP_HOST: &str = "HTTP_HOST";

/// Environment variable holding the bind port.
pub const HTTP_PORT: &str = "HTTP_PORT";

/// Env file read when none is named explicitly.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where configuration is read from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Optional TOML file with `[http]`, `[server]` and `[shutdown]` sections.
    pub config_file: Option<PathBuf>,

    /// Env file to read. When `None`, `.env` is read if it exists.
    /// When set, the file must exist.
    pub env_file: Option<PathBuf>,
}

/// Load and validate configuration using the process environment.
pub fn load_config(sources: &ConfigSources) -> Result<ServiceConfig, ConfigError> {
    load_config_from(sources, std::env::vars())
}

/// Load and validate configuration with an explicit set of environment variables.
///
/// Precedence, lowest first: defaults, config file, env file, `vars`.
pub fn load_config_from<I>(sources: &ConfigSources, vars: I) -> Result<ServiceConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let file = match &sources.config_file {
        Some(path) => read_config_file(path)?,
        None => FileConfig::default(),
    };

    let mut env: HashMap<String, String> = read_env_file(sources)?.into_iter().collect();
    env.extend(vars);

    let host = match env.remove(HTTP_HOST) {
        Some(host) => host,
        None => file.http.host.ok_or(ConfigError::Missing(HTTP_HOST))?,
    };

    let port = match env.remove(HTTP_PORT) {
        Some(raw) => parse_port(&raw)?,
        None => file.http.port.ok_or(ConfigError::Missing(HTTP_PORT))?,
    };

    let config = ServiceConfig {
        http: HttpConfig { host, port },
        server: file.server,
        shutdown: file.shutdown,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(address = %config.address(), "Configuration resolved");
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_env_file(sources: &ConfigSources) -> Result<Vec<(String, String)>, ConfigError> {
    let (path, required) = match &sources.env_file {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_ENV_FILE), false),
    };

    let iter = match dotenvy::from_path_iter(&path) {
        Ok(iter) => iter,
        Err(err) if !required && err.not_found() => return Ok(Vec::new()),
        Err(source) => return Err(ConfigError::EnvFile { path, source }),
    };

    iter.collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::EnvFile { path, source })
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        key: HTTP_PORT,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Sources that never pick up a stray `.env` from the working directory.
    fn isolated(dir: &tempfile::TempDir) -> ConfigSources {
        let env_file = dir.path().join("empty.env");
        fs::write(&env_file, "").unwrap();
        ConfigSources {
            config_file: None,
            env_file: Some(env_file),
        }
    }

    #[test]
    fn loads_address_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(
            &isolated(&dir),
            vars(&[(HTTP_HOST, "127.0.0.1"), (HTTP_PORT, "8080")]),
        )
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.shutdown.grace_period_secs, 60);
    }

    #[test]
    fn missing_host_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&isolated(&dir), vars(&[(HTTP_PORT, "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(HTTP_HOST)));
    }

    #[test]
    fn malformed_port_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(
            &isolated(&dir),
            vars(&[(HTTP_HOST, "localhost"), (HTTP_PORT, "eighty")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: HTTP_PORT, .. }));
    }

    #[test]
    fn env_file_is_overridden_by_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("service.env");
        let mut env_file = fs::File::create(&env_path).unwrap();
        writeln!(env_file, "HTTP_HOST=10.0.0.1").unwrap();
        writeln!(env_file, "HTTP_PORT=7000").unwrap();

        let sources = ConfigSources {
            config_file: None,
            env_file: Some(env_path),
        };
        let config = load_config_from(&sources, vars(&[(HTTP_PORT, "7001")])).unwrap();

        assert_eq!(config.http.host, "10.0.0.1");
        assert_eq!(config.http.port, 7001);
    }

    #[test]
    fn explicit_env_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let sources = ConfigSources {
            config_file: None,
            env_file: Some(dir.path().join("absent.env")),
        };
        let err = load_config_from(&sources, vars(&[(HTTP_HOST, "h"), (HTTP_PORT, "1")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn config_file_supplies_defaults_for_environment() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("service.toml");
        fs::write(
            &toml_path,
            "[http]\nhost = \"0.0.0.0\"\nport = 9000\n\n[shutdown]\ngrace_period_secs = 5\n",
        )
        .unwrap();

        let mut sources = isolated(&dir);
        sources.config_file = Some(toml_path);
        let config = load_config_from(&sources, vars(&[(HTTP_PORT, "9100")])).unwrap();

        assert_eq!(config.address(), "0.0.0.0:9100");
        assert_eq!(config.shutdown.grace_period_secs, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("service.toml");
        fs::write(&toml_path, "[server]\nmax_connections = 0\n").unwrap();

        let mut sources = isolated(&dir);
        sources.config_file = Some(toml_path);
        let err = load_config_from(&sources, vars(&[(HTTP_HOST, "h"), (HTTP_PORT, "1")])).unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
