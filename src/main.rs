use std::process::ExitCode;

use eqsolve::server::{self, ServerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match server::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "server stopped");
            ExitCode::FAILURE
        }
    }
}
