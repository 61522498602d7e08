use std::process::ExitCode;

use clap::Parser;

use file_downloader::cli::Cli;
use file_downloader::{App, ServiceProvider};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let provider = ServiceProvider::new(cli.config_sources(), cli.log_config());

    let app = match App::new(&provider) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %app.config().address(),
        "file-downloader starting"
    );

    match app.run().await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}
