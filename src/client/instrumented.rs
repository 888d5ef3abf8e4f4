//! HTTP client that carries request identity and records every call.

use std::error::Error as StdError;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Method, Request, Response};
use serde::Serialize;

use crate::client::latency::LatencyWatch;
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{DownstreamFailure, TaxonomyError};
use crate::http::request::{X_CLIENT_ID, X_REQUEST_ID};
use crate::normalize::{redact_query, reduce_cardinality};
use crate::observability::{LatencyTimer, MetricRecorder};

const JSON: &str = "application/json";
const SCOPE_CANCELLED: &str = "request scope cancelled";

/// Outbound client for one downstream service.
#[derive(Debug, Clone)]
pub struct InstrumentedClient {
    name: String,
    base_url: String,
    http: reqwest::Client,
    warning_threshold: Duration,
    metrics: MetricRecorder,
}

impl InstrumentedClient {
    /// Create a client with a default HTTP client and no per-call timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        warning_threshold: Duration,
        metrics: MetricRecorder,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            warning_threshold,
            metrics,
        }
    }

    /// Create a client from configuration.
    pub fn from_config(
        name: impl Into<String>,
        base_url: impl Into<String>,
        config: &ClientConfig,
        metrics: MetricRecorder,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            http,
            warning_threshold: Duration::from_millis(config.warning_threshold_ms),
            metrics,
        })
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, ctx: &RequestContext, path: &str) -> Result<Response, TaxonomyError> {
        self.request::<()>(ctx, path, Method::GET, None).await
    }

    pub async fn post<B>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<Response, TaxonomyError>
    where
        B: Serialize + ?Sized,
    {
        self.request(ctx, path, Method::POST, Some(body)).await
    }

    pub async fn put<B>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<Response, TaxonomyError>
    where
        B: Serialize + ?Sized,
    {
        self.request(ctx, path, Method::PUT, Some(body)).await
    }

    pub async fn delete(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> Result<Response, TaxonomyError> {
        self.request::<()>(ctx, path, Method::DELETE, None).await
    }

    /// Perform one call to `base_url + path`.
    ///
    /// Returns the response for statuses below 300. Anything else, including a
    /// cancelled scope while waiting for the response or reading an error body,
    /// comes back as a BadGateway error correlated with the request id. A payload
    /// that cannot be encoded fails before sending with an internal error and
    /// records no sample.
    pub async fn request<B>(
        &self,
        ctx: &RequestContext,
        path: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Response, TaxonomyError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let log_path = redact_query(path);
        tracing::debug!(
            client = %self.name,
            method = %method,
            path = %log_path,
            request_id = %ctx.id(),
            "Calling downstream service"
        );

        let _watch = LatencyWatch::start(&self.name, log_path, ctx, self.warning_threshold);
        let request = self.build_request(ctx, &url, &method, body)?;

        let endpoint = reduce_cardinality(&url);
        let timer = LatencyTimer::start();
        let outcome = tokio::select! {
            biased;
            _ = ctx.scope().cancelled() => Err(SCOPE_CANCELLED.to_string()),
            result = self.http.execute(request) => result.map_err(|e| describe(&e)),
        };

        match outcome {
            Ok(response) if response.status().as_u16() < 300 => {
                self.metrics.record_outbound(
                    &endpoint,
                    method.as_str(),
                    response.status().as_u16(),
                    timer.elapsed_ms(),
                );
                Ok(response)
            }
            Ok(response) => {
                let status = response.status().as_u16();
                self.metrics.record_outbound_failure(
                    &endpoint,
                    method.as_str(),
                    Some(status),
                    timer.elapsed_ms(),
                );
                let body = tokio::select! {
                    biased;
                    _ = ctx.scope().cancelled() => Err(SCOPE_CANCELLED.to_string()),
                    bytes = response.bytes() => bytes.map_err(|e| describe(&e)),
                };
                let failure = match &body {
                    Ok(body) => DownstreamFailure::Status {
                        status,
                        body: &body[..],
                    },
                    Err(cause) => DownstreamFailure::UnreadableBody {
                        status,
                        cause: cause.as_str(),
                    },
                };
                Err(TaxonomyError::from_downstream_failure(ctx.id(), failure))
            }
            Err(cause) => {
                self.metrics.record_outbound_failure(
                    &endpoint,
                    method.as_str(),
                    None,
                    timer.elapsed_ms(),
                );
                Err(TaxonomyError::from_downstream_failure(
                    ctx.id(),
                    DownstreamFailure::NoResponse { cause: &cause },
                ))
            }
        }
    }

    fn build_request<B>(
        &self,
        ctx: &RequestContext,
        url: &str,
        method: &Method,
        body: Option<&B>,
    ) -> Result<Request, TaxonomyError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(X_CLIENT_ID, ctx.client_id())
            .header(X_REQUEST_ID, ctx.id())
            .header(ACCEPT_LANGUAGE, ctx.locale())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);

        if let Some(credential) = ctx.credential() {
            builder = builder.bearer_auth(credential);
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                self.build_failed(ctx, "Failed to create request body", method, url, &e)
            })?;
            builder = builder.body(bytes);
        }

        builder
            .build()
            .map_err(|e| self.build_failed(ctx, "Failed to create request", method, url, &e))
    }

    fn build_failed(
        &self,
        ctx: &RequestContext,
        message: &str,
        method: &Method,
        url: &str,
        err: &(dyn StdError + 'static),
    ) -> TaxonomyError {
        let cause = describe(err);
        // The caller's error finalization logs the resulting 500.
        tracing::warn!(
            client = %self.name,
            method = %method,
            url = %redact_query(url),
            request_id = %ctx.id(),
            error = %cause,
            "{}", message
        );
        TaxonomyError::internal(format!("{}: {}", message, cause)).with_correlation_id(ctx.id())
    }
}

/// Error message followed by its source chain.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}
