use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use evalgate::error::ConfigurationError;
use evalgate::http::client::ReqwestTransport;
use evalgate::http::method::HttpMethod;
use evalgate::integration::{EndpointConfig, FailureKind, TestExample};
use evalgate::testing::EndpointTestHarness;
use serde_json::{Value, json};

#[derive(Default)]
struct Recorder {
    hits: AtomicUsize,
    seen: Mutex<Vec<(Method, Option<String>, String)>>,
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answers `/ok` with JSON, `/fail` with a 500 and `/slow` after two seconds.
async fn spawn_model(recorder: Arc<Recorder>) -> String {
    async fn record(recorder: &Recorder, method: Method, headers: &HeaderMap, body: String) {
        recorder.hits.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        recorder.seen.lock().unwrap().push((method, auth, body));
    }

    let app = Router::new()
        .route(
            "/ok",
            any(
                |State(recorder): State<Arc<Recorder>>, method: Method, headers: HeaderMap, body: String| async move {
                    record(&recorder, method, &headers, body).await;
                    Json(json!({ "ok": true }))
                },
            ),
        )
        .route(
            "/fail",
            any(
                |State(recorder): State<Arc<Recorder>>, method: Method, headers: HeaderMap, body: String| async move {
                    record(&recorder, method, &headers, body).await;
                    (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response()
                },
            ),
        )
        .route(
            "/slow",
            any(|State(recorder): State<Arc<Recorder>>| async move {
                recorder.hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .with_state(recorder);

    spawn(app).await
}

/// Serves one connection with a response whose body stops short of its
/// declared length, then hangs up.
fn spawn_truncated(status_line: &'static str) -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut chunk).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
        }
        let response = format!("{status_line}\r\nContent-Length: 100\r\n\r\nshort");
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}")
}

fn config(url: String, method: HttpMethod) -> EndpointConfig {
    EndpointConfig {
        name: "model".to_string(),
        url,
        method,
        headers_template: r#"{"Content-Type": "application/json", "Authorization": "Bearer test-key"}"#
            .to_string(),
        ..EndpointConfig::default()
    }
}

#[tokio::test]
async fn passing_post_records_parsed_response() {
    let recorder = Arc::new(Recorder::default());
    let base = spawn_model(recorder.clone()).await;
    let harness = EndpointTestHarness::new();
    let mut examples = vec![TestExample::new(r#"{"prompt":"hi"}"#)];

    let summary = harness
        .run_all_tests(&config(format!("{base}/ok"), HttpMethod::Post), &mut examples)
        .await
        .unwrap();

    assert!(summary.has_successful_test);
    let result = examples[0].result.as_ref().unwrap();
    assert!(result.success);
    assert_eq!(result.status, Some(200));
    assert_eq!(result.response, Some(json!({ "ok": true })));
    assert!(result.error.is_none());

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, Method::POST);
    assert_eq!(seen[0].1.as_deref(), Some("Bearer test-key"));
    assert_eq!(serde_json::from_str::<Value>(&seen[0].2).unwrap(), json!({ "prompt": "hi" }));
}

#[tokio::test]
async fn server_error_and_bad_payload_both_fail() {
    let recorder = Arc::new(Recorder::default());
    let base = spawn_model(recorder.clone()).await;
    let harness = EndpointTestHarness::new();
    let mut examples = vec![
        TestExample::new(r#"{"prompt":"hi"}"#),
        TestExample::new("{bad"),
    ];

    let summary = harness
        .run_all_tests(&config(format!("{base}/fail"), HttpMethod::Post), &mut examples)
        .await
        .unwrap();

    assert!(!summary.has_successful_test);
    assert_eq!(summary.report.failed, 2);

    let first = examples[0].result.as_ref().unwrap();
    assert!(!first.success);
    assert_eq!(first.status, Some(500));
    assert_eq!(first.error.as_deref(), Some("HTTP 500: Internal Server Error"));
    assert_eq!(first.response, Some(Value::String("model crashed".into())));

    let second = examples[1].result.as_ref().unwrap();
    assert!(!second.success);
    assert_eq!(second.status, None);
    assert_eq!(second.failure, Some(FailureKind::PayloadParse));
    assert!(second.error.is_some());

    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn get_sends_no_body() {
    let recorder = Arc::new(Recorder::default());
    let base = spawn_model(recorder.clone()).await;
    let harness = EndpointTestHarness::new();
    let mut examples = vec![TestExample::new(r#"{"prompt":"hi","temperature":0.7}"#)];

    harness
        .run_all_tests(&config(format!("{base}/ok"), HttpMethod::Get), &mut examples)
        .await
        .unwrap();

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(seen[0].0, Method::GET);
    assert!(seen[0].2.is_empty());
    assert_eq!(
        examples[0].result.as_ref().unwrap().input,
        json!({ "prompt": "hi", "temperature": 0.7 })
    );
}

#[tokio::test]
async fn malformed_headers_make_no_calls() {
    let recorder = Arc::new(Recorder::default());
    let base = spawn_model(recorder.clone()).await;
    let harness = EndpointTestHarness::new();
    let mut cfg = config(format!("{base}/ok"), HttpMethod::Post);
    cfg.headers_template = "not json".to_string();
    let mut examples = vec![TestExample::new(r#"{"prompt":"hi"}"#)];

    let err = harness.run_all_tests(&cfg, &mut examples).await.unwrap_err();

    assert_eq!(err, ConfigurationError::InvalidHeadersJson);
    assert!(examples[0].result.is_none());
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let harness = EndpointTestHarness::new();
    let mut examples = vec![TestExample::new(r#"{"prompt":"hi"}"#), TestExample::new("{}")];

    let summary = harness
        .run_all_tests(&config(format!("http://{addr}/ok"), HttpMethod::Post), &mut examples)
        .await
        .unwrap();

    assert!(!summary.has_successful_test);
    for example in &examples {
        let result = example.result.as_ref().unwrap();
        assert_eq!(result.failure, Some(FailureKind::Transport));
        assert_eq!(result.status, None);
        assert!(result.error.as_deref().unwrap().starts_with("Request failed"));
    }
    assert_eq!(examples[0].result.as_ref().unwrap().input, json!({ "prompt": "hi" }));
}

#[tokio::test]
async fn caller_timeout_ends_a_hung_request() {
    let recorder = Arc::new(Recorder::default());
    let base = spawn_model(recorder.clone()).await;
    let transport = ReqwestTransport::with_timeout(Some(Duration::from_millis(200))).unwrap();
    let harness = EndpointTestHarness::with_transport(transport);
    let mut examples = vec![TestExample::new("{}")];

    let summary = harness
        .run_all_tests(&config(format!("{base}/slow"), HttpMethod::Post), &mut examples)
        .await
        .unwrap();

    assert!(!summary.has_successful_test);
    let result = examples[0].result.as_ref().unwrap();
    assert_eq!(result.failure, Some(FailureKind::Transport));
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cut_off_body_is_a_transport_failure() {
    let base = spawn_truncated("HTTP/1.1 200 OK");
    let harness = EndpointTestHarness::new();
    let mut examples = vec![TestExample::new(r#"{"prompt":"hi"}"#)];

    let summary = harness
        .run_all_tests(&config(format!("{base}/ok"), HttpMethod::Get), &mut examples)
        .await
        .unwrap();

    assert!(!summary.has_successful_test);
    let result = examples[0].result.as_ref().unwrap();
    assert_eq!(result.failure, Some(FailureKind::Transport));
    assert_eq!(result.status, None);
    assert!(result.error.as_deref().unwrap().starts_with("Request failed: "));
}
