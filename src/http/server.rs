//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the service's routes
//! - Wire up the instrumentation chain
//! - Serve health and metrics endpoints
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::Uri;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;

use crate::config::ServiceConfig;
use crate::error::{HandlerError, TaxonomyError};
use crate::http::middleware::{
    enforce_deadline, log_requests, record_metrics, recover, RequestTimeout,
};
use crate::http::request::{assign_request_id, extract_locale, DefaultLocale};
use crate::http::response::{finalize_errors, ok_status};
use crate::observability::MetricRecorder;

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";

/// Metrics endpoint path.
pub const METRICS_PATH: &str = "/metrics";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Liveness probe behind the health endpoint.
pub trait HealthCheck: Send + Sync + 'static {
    fn check(&self) -> Result<(), HandlerError>;
}

impl<F, E> HealthCheck for F
where
    F: Fn() -> Result<(), E> + Send + Sync + 'static,
    E: Into<HandlerError>,
{
    fn check(&self) -> Result<(), HandlerError> {
        self().map_err(Into::into)
    }
}

/// Health check that always passes.
pub fn always_healthy() -> impl HealthCheck {
    || Ok::<(), TaxonomyError>(())
}

/// State for the built-in endpoints.
#[derive(Clone)]
struct AppState {
    metrics: MetricRecorder,
    health: Arc<dyn HealthCheck>,
}

/// HTTP server for an instrumented service.
pub struct HttpServer {
    config: ServiceConfig,
    metrics: MetricRecorder,
    health: Arc<dyn HealthCheck>,
    routes: Router,
}

impl HttpServer {
    /// Create a server with only the built-in endpoints.
    pub fn new(config: ServiceConfig, metrics: MetricRecorder, health: impl HealthCheck) -> Self {
        Self {
            config,
            metrics,
            health: Arc::new(health),
            routes: Router::new(),
        }
    }

    /// Add service routes. They must not claim the health or metrics paths.
    pub fn with_routes(mut self, routes: Router) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// Router with every route wrapped in the instrumentation chain.
    pub fn router(&self) -> Router {
        let state = AppState {
            metrics: self.metrics.clone(),
            health: self.health.clone(),
        };
        let default_locale = DefaultLocale::new(&self.config.request.default_locale);
        let timeout = RequestTimeout(Duration::from_secs(self.config.request.timeout_secs));

        let chain = ServiceBuilder::new()
            .layer(from_fn_with_state(self.metrics.clone(), recover))
            .layer(from_fn_with_state(self.metrics.clone(), record_metrics))
            .layer(from_fn(assign_request_id))
            .layer(from_fn_with_state(default_locale, extract_locale))
            .layer(from_fn(log_requests))
            .layer(from_fn(finalize_errors))
            .layer(from_fn_with_state(timeout, enforce_deadline));

        Router::new()
            .route(HEALTH_PATH, get(check_health))
            .route(METRICS_PATH, get(render_metrics))
            .with_state(state)
            .merge(self.routes.clone())
            .fallback(route_not_found)
            .layer(chain)
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn check_health(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    state.health.check()?;
    Ok(ok_status())
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.metrics.render())
}

async fn route_not_found(uri: Uri) -> TaxonomyError {
    TaxonomyError::not_found(format!("No route for path: {}", uri.path()))
}
