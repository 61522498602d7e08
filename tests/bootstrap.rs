//! Startup failures are fatal.

use std::future::pending;
use std::process::Command;
use std::time::Duration;

use file_downloader::config::ConfigError;
use file_downloader::{App, AppError, ServiceProvider};

mod common;

use common::{local_config, log_config};

#[test]
fn missing_configuration_fails_initialization() {
    let logs = tempfile::tempdir().unwrap();
    let provider = ServiceProvider::with_config_loader(
        || Err(ConfigError::Missing("HTTP_HOST")),
        log_config(&logs),
    );

    let err = App::new(&provider).err().expect("initialization must fail");
    assert!(matches!(err, AppError::Config(ConfigError::Missing("HTTP_HOST"))));
}

#[tokio::test]
async fn bind_failure_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = local_config(5);
    config.http.port = taken.local_addr().unwrap().port();

    let logs = tempfile::tempdir().unwrap();
    let provider = common::provider(config, &logs);
    let app = App::new(&provider).unwrap();
    let listening = app.listening();

    let result = tokio::time::timeout(Duration::from_secs(5), app.run_until(pending()))
        .await
        .expect("bind failure must end the run");

    assert!(matches!(result, Err(AppError::Server(_))));
    assert!(listening.borrow().is_none());
}

#[test]
fn binary_exits_non_zero_without_bind_address() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("logs").join("downloader.log");

    let output = Command::new(env!("CARGO_BIN_EXE_file-downloader"))
        .env_clear()
        .current_dir(dir.path())
        .arg("--log-file")
        .arg(&log_file)
        .output()
        .expect("binary should start");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("HTTP_HOST"), "cause should be logged: {stdout}");

    let file_log = std::fs::read_to_string(&log_file).expect("file sink should be written");
    assert!(file_log.lines().any(|line| line.contains("\"level\":\"ERROR\"")));
}
