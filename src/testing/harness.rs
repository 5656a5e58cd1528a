use std::time::Instant;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::ConfigurationError;
use crate::http::client::{build_headers, ReqwestTransport, Transport};
use crate::http::request::RequestInput;
use crate::integration::{EndpointConfig, TestExample, TestResult};

use super::{RunReport, RunSummary};

/// Runs every test example of an endpoint configuration, one after the other,
/// and records a [`TestResult`] on each.
pub struct EndpointTestHarness<T = ReqwestTransport> {
    transport: T,
}

impl EndpointTestHarness<ReqwestTransport> {
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl Default for EndpointTestHarness<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> EndpointTestHarness<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn run_all_tests(
        &self,
        config: &EndpointConfig,
        examples: &mut [TestExample],
    ) -> Result<RunSummary, ConfigurationError> {
        self.run_all_tests_with_progress(config, examples, |_, _| {}).await
    }

    /// Like [`run_all_tests`](Self::run_all_tests), calling `on_progress`
    /// with the example index and its fresh result as soon as each example
    /// finishes.
    pub async fn run_all_tests_with_progress<F>(
        &self,
        config: &EndpointConfig,
        examples: &mut [TestExample],
        mut on_progress: F,
    ) -> Result<RunSummary, ConfigurationError>
    where
        F: FnMut(usize, &TestResult),
    {
        check_run_target(config, examples)?;
        let headers = parse_headers_template(&config.headers_template)?;

        tracing::info!(
            url = %config.url,
            method = %config.method,
            examples = examples.len(),
            "running endpoint tests"
        );
        let started = Instant::now();

        for (index, example) in examples.iter_mut().enumerate() {
            let result = self.run_example(config, &headers, &example.input).await;
            if result.success {
                tracing::debug!(index, status = ?result.status, "test example passed");
            } else {
                tracing::warn!(
                    index,
                    status = ?result.status,
                    error = result.error.as_deref().unwrap_or_default(),
                    "test example failed"
                );
            }
            let result = &*example.result.insert(result);
            on_progress(index, result);
        }

        let passed = examples.iter().filter(|example| example.passed()).count();
        let report = RunReport {
            total: examples.len(),
            passed,
            failed: examples.len() - passed,
            duration_ms: started.elapsed().as_millis(),
        };
        tracing::info!(passed = report.passed, failed = report.failed, "endpoint tests finished");

        Ok(RunSummary {
            has_successful_test: passed > 0,
            report,
        })
    }

    async fn run_example(&self, config: &EndpointConfig, headers: &HeaderMap, input: &str) -> TestResult {
        let payload: Value = match serde_json::from_str(input) {
            Ok(payload) => payload,
            Err(e) => return TestResult::payload_parse_failure(format!("Invalid JSON in test example: {e}")),
        };

        let body = if config.method.carries_body() {
            Some(payload.to_string())
        } else {
            None
        };
        let request = RequestInput {
            method: config.method,
            url: config.url.clone(),
            headers: headers.clone(),
            body,
        };

        match self.transport.send(request).await {
            Ok(response) => TestResult::completed(payload, &response),
            Err(message) => TestResult::transport_failure(payload, message),
        }
    }
}

/// The checks that stop a run before it begins: an endpoint to call and at
/// least one example to send.
pub fn check_run_target(config: &EndpointConfig, examples: &[TestExample]) -> Result<(), ConfigurationError> {
    if config.url.trim().is_empty() {
        return Err(ConfigurationError::MissingUrl);
    }
    if examples.is_empty() {
        return Err(ConfigurationError::NoExamples);
    }
    Ok(())
}

/// Parse the headers template once per run.
pub fn parse_headers_template(template: &str) -> Result<HeaderMap, ConfigurationError> {
    let parsed: Value =
        serde_json::from_str(template).map_err(|_| ConfigurationError::InvalidHeadersJson)?;
    let Value::Object(map) = parsed else {
        return Err(ConfigurationError::InvalidHeadersJson);
    };
    build_headers(&map).map_err(|(name, reason)| ConfigurationError::InvalidHeader { name, reason })
}
