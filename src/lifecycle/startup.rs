//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ConfigError;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::MetricsError;

/// Errors that stop the service from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn serve(server: HttpServer) -> Result<(), StartupError> {
    let address = server.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    server.run(listener, receiver).await.map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::http::always_healthy;
    use crate::observability::MetricRecorder;

    #[tokio::test]
    async fn test_bind_failure_names_address() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let taken_address = taken.local_addr().unwrap().to_string();

        let mut config = ServiceConfig::default();
        config.listener.bind_address = taken_address.clone();
        let server = HttpServer::new(config, MetricRecorder::new().unwrap(), always_healthy());

        match serve(server).await {
            Err(StartupError::Bind { address, .. }) => assert_eq!(address, taken_address),
            other => panic!("expected bind error, got {:?}", other),
        }
    }
}
