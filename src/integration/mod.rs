//! # Endpoint Integrations
//!
//! Value objects describing an HTTP-callable model endpoint and the example
//! payloads used to prove it works before it is registered with the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::method::HttpMethod;
use crate::http::response::HttpResponse;

pub const DEFAULT_HEADERS_TEMPLATE: &str =
    r#"{"Content-Type": "application/json", "Authorization": "Bearer your-api-key-here"}"#;
pub const DEFAULT_PARAM_SCHEMA: &str = r#"{"prompt": "string", "temperature": "number"}"#;
pub const DEFAULT_PARAM_DEFAULTS: &str = r#"{"temperature": 0.7}"#;
pub const DEFAULT_EXAMPLE_INPUT: &str =
    r#"{"prompt": "What is the capital of France?", "temperature": 0.7}"#;
pub const NEW_EXAMPLE_INPUT: &str = r#"{"prompt": "Your test prompt here", "temperature": 0.7}"#;

/// User-authored description of a callable endpoint. The JSON fields are
/// kept as the text the user typed; they are parsed when they are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_headers_template")]
    pub headers_template: String,
    #[serde(default = "default_param_schema")]
    pub param_schema: String,
    #[serde(default = "default_param_defaults")]
    pub param_defaults: String,
}

fn default_headers_template() -> String {
    DEFAULT_HEADERS_TEMPLATE.to_string()
}

fn default_param_schema() -> String {
    DEFAULT_PARAM_SCHEMA.to_string()
}

fn default_param_defaults() -> String {
    DEFAULT_PARAM_DEFAULTS.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            method: HttpMethod::default(),
            headers_template: default_headers_template(),
            param_schema: default_param_schema(),
            param_defaults: default_param_defaults(),
        }
    }
}

/// One candidate request body, plus the outcome of its latest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExample {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
}

impl TestExample {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            result: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.result.as_ref().is_some_and(|result| result.success)
    }
}

impl Default for TestExample {
    fn default() -> Self {
        Self::new(DEFAULT_EXAMPLE_INPUT)
    }
}

/// Why a test example failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PayloadParse,
    Transport,
    HttpStatus,
}

/// Outcome of running one example against one configuration at one moment.
/// Replaced wholesale on every re-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub input: Value,
}

impl TestResult {
    /// The example text could not be parsed; nothing was sent.
    pub fn payload_parse_failure(message: String) -> Self {
        Self {
            success: false,
            status: None,
            response: None,
            error: Some(message),
            failure: Some(FailureKind::PayloadParse),
            duration_ms: None,
            timestamp: Utc::now(),
            input: Value::Object(Default::default()),
        }
    }

    /// The request was sent but never completed.
    pub fn transport_failure(input: Value, message: String) -> Self {
        Self {
            success: false,
            status: None,
            response: None,
            error: Some(message),
            failure: Some(FailureKind::Transport),
            duration_ms: None,
            timestamp: Utc::now(),
            input,
        }
    }

    /// The request completed; any status outside 2xx is a failure.
    pub fn completed(input: Value, response: &HttpResponse) -> Self {
        let success = response.is_success();
        let status = response.status;
        let status_text = &response.status_text;
        let duration_ms = response.duration_ms;
        let response = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));

        Self {
            success,
            status: Some(status),
            response: Some(response),
            error: (!success).then(|| format!("HTTP {status}: {status_text}")),
            failure: (!success).then_some(FailureKind::HttpStatus),
            duration_ms: Some(duration_ms),
            timestamp: Utc::now(),
            input,
        }
    }
}
