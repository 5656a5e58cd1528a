use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::{Map, Value};

use super::request::RequestInput;
use super::response::HttpResponse;

/// Something that can carry one request to an endpoint and bring back its
/// response. `Err` means the request never completed.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: RequestInput,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, String>> + Send + '_>>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Build a transport that gives up on a request after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, String> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: RequestInput,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, String>> + Send + '_>> {
        Box::pin(send_request(&self.client, request))
    }
}

pub async fn send_request(client: &Client, request: RequestInput) -> Result<HttpResponse, String> {
    let method: reqwest::Method = request.method.into();
    let mut req_builder = client.request(method, &request.url).headers(request.headers);

    if let Some(body) = request.body {
        req_builder = req_builder.body(body);
    }

    let started = Instant::now();
    let response = req_builder
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    let elapsed = started.elapsed().as_millis() as u64;

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        duration_ms: elapsed,
        body,
    })
}

/// Turn a parsed JSON header object into a header map. Scalar values are
/// rendered as text; null and structured values are rejected.
pub fn build_headers(input: &Map<String, Value>) -> Result<HeaderMap, (String, String)> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        let value = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                return Err((key.clone(), "value must be a string, number or boolean".to_string()));
            }
        };

        let header_name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|e| (key.clone(), e.to_string()))?;
        let header_value = HeaderValue::from_str(&value).map_err(|e| (key.clone(), e.to_string()))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
