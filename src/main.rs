//! Standalone instrumented service exposing the health and metrics endpoints.

use std::path::PathBuf;

use clap::Parser;

use callscope::config::{load_config, ServiceConfig};
use callscope::http::{always_healthy, HttpServer};
use callscope::lifecycle::{serve, StartupError};
use callscope::observability::logging::init_logging;
use callscope::observability::MetricRecorder;

#[derive(Parser, Debug)]
#[command(name = "callscope", version, about = "Instrumented HTTP service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("callscope v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_locale = %config.request.default_locale,
        request_timeout_secs = config.request.timeout_secs,
        "Configuration loaded"
    );

    let metrics = MetricRecorder::new()?;
    let server = HttpServer::new(config, metrics, always_healthy());
    serve(server).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
