use std::process::ExitCode;

use clap::Parser;
use taskmaster_verify::{Verifier, DEFAULT_BASE_URL};
use tracing_subscriber::EnvFilter;

/// Runs create → list → complete → delete → list against a live server.
#[derive(Parser)]
#[command(name = "verify-api", version, about = "Smoke-test a running Task Master API")]
struct Cli {
    /// URL of the tasks collection.
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match Verifier::new(cli.base_url).run().await {
        Ok(()) => {
            tracing::info!("API VERIFICATION SUCCESSFUL");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "VERIFICATION FAILED");
            ExitCode::FAILURE
        }
    }
}
