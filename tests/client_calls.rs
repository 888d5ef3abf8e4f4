//! Outbound calls through the instrumented client.

use std::time::Duration;

use callscope::config::ClientConfig;
use callscope::context::WorkScope;
use callscope::{ErrorKind, InstrumentedClient, MetricRecorder, RequestContext};
use serde_json::Value;
use tracing::Level;

mod common;

fn client(addr: std::net::SocketAddr, metrics: &MetricRecorder) -> InstrumentedClient {
    InstrumentedClient::new(
        "things",
        format!("http://{}", addr),
        Duration::from_secs(5),
        metrics.clone(),
    )
}

fn sample_count(rendered: &str, name: &str, endpoint: &str, status: u16) -> Option<u64> {
    let endpoint_label = format!("endpoint=\"{}\"", endpoint);
    let status_label = format!("status=\"{}\"", status);
    rendered
        .lines()
        .find(|line| {
            line.starts_with(&format!("{}{{", name))
                && line.contains(&endpoint_label)
                && line.contains(&status_label)
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[tokio::test]
async fn test_successful_call_is_recorded() {
    let addr = common::start_programmable_backend(|| async {
        (200, r#"{"name":"widget"}"#.to_string())
    })
    .await;
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let ctx = RequestContext::from_root("client-1", "sv", None);

    let response = client
        .get(&ctx, "/v1/things/3f2504e0-4f89-11d3-9a0c-0305e82c3301?expand=true")
        .await
        .expect("call should succeed");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "widget");

    let endpoint = format!("http://{}/v1/things/:id", addr);
    let rendered = metrics.render();
    assert_eq!(
        sample_count(&rendered, "rpc_requests_total", &endpoint, 200),
        Some(1)
    );
    assert!(rendered
        .lines()
        .any(|l| l.starts_with("rpc_request_latency_ms_count{") && l.contains(&endpoint)));
}

#[tokio::test]
async fn test_error_status_becomes_bad_gateway() {
    let addr = common::start_programmable_backend(|| async {
        (404, r#"{"code":4041,"message":"thing not found"}"#.to_string())
    })
    .await;
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let ctx = RequestContext::new(&WorkScope::root(), "req-404", "client-1", "sv", None);

    let err = client.get(&ctx, "/v1/things/1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadGateway);
    assert_eq!(err.id(), "req-404");
    assert!(err.message().contains("status=[404]"));
    assert!(err.message().contains("code=[4041]"));
    assert!(err.message().contains("message=[thing not found]"));

    let endpoint = format!("http://{}/v1/things/1", addr);
    assert_eq!(
        sample_count(&metrics.render(), "rpc_requests_total", &endpoint, 404),
        Some(1)
    );
}

#[tokio::test]
async fn test_unreadable_error_body() {
    let addr =
        common::start_programmable_backend(|| async { (500, "<html>oops</html>".to_string()) })
            .await;
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let ctx = RequestContext::new(&WorkScope::root(), "req-500", "client-1", "sv", None);

    let err = client.get(&ctx, "/v1/things").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadGateway);
    assert!(err.message().contains("error body unreadable"));
    assert!(err.message().contains("status=[500]"));
}

#[tokio::test]
async fn test_connection_refused_records_no_response_status() {
    let addr = common::refused_addr();
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let ctx = RequestContext::new(&WorkScope::root(), "req-refused", "client-1", "sv", None);

    let err = client.get(&ctx, "/v1/things").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadGateway);
    assert_eq!(err.id(), "req-refused");
    assert!(err.message().contains("no response"));

    let endpoint = format!("http://{}/v1/things", addr);
    assert_eq!(
        sample_count(&metrics.render(), "rpc_requests_total", &endpoint, 503),
        Some(1)
    );
}

#[tokio::test]
async fn test_identity_headers_reach_downstream() {
    let addr = common::start_echo_backend().await;
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let ctx = RequestContext::new(
        &WorkScope::root(),
        "req-headers",
        "client-7",
        "en",
        Some("token-7".to_string()),
    );

    let response = client
        .post(&ctx, "/v1/things", &serde_json::json!({ "name": "widget" }))
        .await
        .unwrap();
    let headers: Value = response.json().await.unwrap();

    assert_eq!(headers["x-request-id"], "req-headers");
    assert_eq!(headers["x-clientid"], "client-7");
    assert_eq!(headers["accept-language"], "en");
    assert_eq!(headers["authorization"], "Bearer token-7");
    assert_eq!(headers["content-type"], "application/json");
}

#[tokio::test]
async fn test_slow_call_logs_warning() {
    let addr = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        (200, "{}".to_string())
    })
    .await;
    let metrics = MetricRecorder::new().unwrap();
    let client = InstrumentedClient::new(
        "things",
        format!("http://{}", addr),
        Duration::from_millis(1),
        metrics,
    );
    let ctx = RequestContext::from_root("client-1", "sv", None);

    let (events, _guard) = common::capture_events();
    client.get(&ctx, "/v1/things?token=secret").await.unwrap();

    assert_eq!(
        events.messages(Level::WARN),
        vec!["Unusually high latency in service call".to_string()]
    );
}

#[tokio::test]
async fn test_fast_call_logs_no_warning() {
    let addr = common::start_programmable_backend(|| async { (200, "{}".to_string()) }).await;
    let metrics = MetricRecorder::new().unwrap();
    let client = InstrumentedClient::new(
        "things",
        format!("http://{}", addr),
        Duration::from_secs(30),
        metrics,
    );
    let ctx = RequestContext::from_root("client-1", "sv", None);

    let (events, _guard) = common::capture_events();
    client.get(&ctx, "/v1/things").await.unwrap();

    assert_eq!(events.count(Level::WARN), 0);
}

#[tokio::test]
async fn test_cancelled_scope_interrupts_error_body_read() {
    let addr = common::start_stalling_backend().await;
    let metrics = MetricRecorder::new().unwrap();
    let client = client(addr, &metrics);
    let parent = WorkScope::root();
    let ctx = RequestContext::new(&parent, "req-stall", "client-1", "sv", None);

    let canceller = parent.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(3), client.get(&ctx, "/v1/things"))
        .await
        .expect("call should return once the scope is cancelled");
    let err = result.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadGateway);
    assert_eq!(err.id(), "req-stall");
    assert!(err.message().contains("error body unreadable"));
    assert!(err.message().contains("status=[500]"));
    assert!(err.message().contains("request scope cancelled"));

    let endpoint = format!("http://{}/v1/things", addr);
    assert_eq!(
        sample_count(&metrics.render(), "rpc_requests_total", &endpoint, 500),
        Some(1)
    );
}

#[tokio::test]
async fn test_configured_timeout_bounds_the_call() {
    let addr = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, "{}".to_string())
    })
    .await;
    let metrics = MetricRecorder::new().unwrap();
    let config = ClientConfig {
        warning_threshold_ms: 100,
        timeout_secs: 1,
    };
    let client = InstrumentedClient::from_config(
        "things",
        format!("http://{}", addr),
        &config,
        metrics.clone(),
    )
    .unwrap();
    let ctx = RequestContext::new(&WorkScope::root(), "req-timeout", "client-1", "sv", None);

    let (events, _guard) = common::capture_events();
    let result = tokio::time::timeout(Duration::from_secs(2), client.get(&ctx, "/v1/things"))
        .await
        .expect("configured timeout should end the call");
    let err = result.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadGateway);
    assert_eq!(err.id(), "req-timeout");
    assert!(err.message().contains("no response"));

    let endpoint = format!("http://{}/v1/things", addr);
    let rendered = metrics.render();
    assert_eq!(
        sample_count(&rendered, "rpc_requests_total", &endpoint, 503),
        Some(1)
    );
    assert_eq!(
        rendered
            .lines()
            .filter(|l| l.starts_with("rpc_requests_total{") && l.contains(&endpoint))
            .count(),
        1
    );
    assert_eq!(
        events.messages(Level::WARN),
        vec!["Unusually high latency in service call".to_string()]
    );
}
