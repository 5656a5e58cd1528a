//! # Editing Session
//!
//! One endpoint-integration form: configuration, example list, submission
//! gate and the Idle / Testing / Submitting lifecycle around them.

use std::fmt::{self, Display};

use uuid::Uuid;

use crate::api::{ApiClient, CreateIntegration, EndpointIntegration, UpdateIntegration};
use crate::error::SessionError;
use crate::http::client::Transport;
use crate::integration::{EndpointConfig, TestExample, TestResult, NEW_EXAMPLE_INPUT};
use crate::testing::{check_run_target, check_submit, EndpointTestHarness, RunSummary};

pub const MSG_TESTS_PASSED: &str = "At least one test passed! You can now create the integration.";
pub const MSG_TESTS_FAILED: &str = "All tests failed. Please fix your endpoint or test data.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Testing,
    Submitting,
}

impl Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Testing => "testing",
            SessionPhase::Submitting => "submitting",
        };
        write!(f, "{label}")
    }
}

/// Where a submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create { eval_id: Uuid },
    Update { id: Uuid },
}

#[derive(Debug, Clone)]
pub struct EditingSession {
    pub config: EndpointConfig,
    examples: Vec<TestExample>,
    has_successful_test: bool,
    phase: SessionPhase,
    message: Option<String>,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingSession {
    pub fn new() -> Self {
        Self::from_parts(EndpointConfig::default(), vec![TestExample::default()])
    }

    /// Resume a session from a stored configuration and example list. The
    /// gate is derived from whatever results the examples already carry.
    pub fn from_parts(config: EndpointConfig, examples: Vec<TestExample>) -> Self {
        let has_successful_test = examples.iter().any(TestExample::passed);
        Self {
            config,
            examples,
            has_successful_test,
            phase: SessionPhase::Idle,
            message: None,
        }
    }

    pub fn examples(&self) -> &[TestExample] {
        &self.examples
    }

    pub fn has_successful_test(&self) -> bool {
        self.has_successful_test
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Latest user-facing status line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn add_example(&mut self) -> usize {
        self.examples.push(TestExample::new(NEW_EXAMPLE_INPUT));
        self.examples.len() - 1
    }

    pub fn update_example(&mut self, index: usize, input: impl Into<String>) -> Result<(), SessionError> {
        let example = self
            .examples
            .get_mut(index)
            .ok_or(SessionError::UnknownExample(index))?;
        example.input = input.into();
        Ok(())
    }

    pub fn remove_example(&mut self, index: usize) -> Result<TestExample, SessionError> {
        if index >= self.examples.len() {
            return Err(SessionError::UnknownExample(index));
        }
        if self.examples.len() <= 1 {
            return Err(self.fail(SessionError::LastExample));
        }
        Ok(self.examples.remove(index))
    }

    pub async fn run_tests<T: Transport>(
        &mut self,
        harness: &EndpointTestHarness<T>,
    ) -> Result<RunSummary, SessionError> {
        self.run_tests_with_progress(harness, |_, _| {}).await
    }

    pub async fn run_tests_with_progress<T, F>(
        &mut self,
        harness: &EndpointTestHarness<T>,
        on_progress: F,
    ) -> Result<RunSummary, SessionError>
    where
        T: Transport,
        F: FnMut(usize, &TestResult),
    {
        self.ensure_idle()?;
        // Without an endpoint or examples there is nothing to run; the gate stands.
        check_run_target(&self.config, &self.examples).map_err(|e| self.fail(e.into()))?;

        self.has_successful_test = false;
        self.phase = SessionPhase::Testing;
        let outcome = harness
            .run_all_tests_with_progress(&self.config, &mut self.examples, on_progress)
            .await;
        self.phase = SessionPhase::Idle;

        let summary = outcome.map_err(|e| self.fail(e.into()))?;
        self.has_successful_test = summary.has_successful_test;
        self.message = Some(if summary.has_successful_test {
            MSG_TESTS_PASSED.to_string()
        } else {
            MSG_TESTS_FAILED.to_string()
        });
        Ok(summary)
    }

    pub async fn submit(&mut self, api: &ApiClient, target: SubmitTarget) -> Result<EndpointIntegration, SessionError> {
        self.ensure_idle()?;
        let submission = check_submit(&self.config, &self.examples, self.has_successful_test)
            .map_err(|e| self.fail(e.into()))?;

        self.phase = SessionPhase::Submitting;
        let outcome = match target {
            SubmitTarget::Create { eval_id } => {
                let payload = CreateIntegration {
                    name: self.config.name.clone(),
                    endpoint_url: self.config.url.clone(),
                    http_method: self.config.method,
                    param_schema: submission.param_schema,
                    param_defaults: submission.param_defaults,
                    test_examples: submission.test_examples,
                    eval_id,
                };
                api.create_integration(&payload)
                    .await
                    .map_err(|source| SessionError::Api { action: "create", source })
            }
            SubmitTarget::Update { id } => {
                let payload = UpdateIntegration {
                    name: Some(self.config.name.clone()),
                    endpoint_url: Some(self.config.url.clone()),
                    http_method: Some(self.config.method),
                    param_schema: Some(submission.param_schema),
                    param_defaults: Some(submission.param_defaults),
                    test_examples: Some(submission.test_examples),
                };
                api.update_integration(id, &payload)
                    .await
                    .map_err(|source| SessionError::Api { action: "update", source })
            }
        };
        self.phase = SessionPhase::Idle;

        let record = outcome.map_err(|e| self.fail(e))?;
        match target {
            SubmitTarget::Create { .. } => {
                *self = Self::new();
                self.message = Some("Endpoint integration created successfully!".to_string());
            }
            SubmitTarget::Update { .. } => {
                self.message = Some("Endpoint integration updated successfully!".to_string());
            }
        }
        Ok(record)
    }

    /// Throw away results and any interrupted run; the form text is kept.
    pub fn reload(&mut self) {
        for example in &mut self.examples {
            example.result = None;
        }
        self.has_successful_test = false;
        self.phase = SessionPhase::Idle;
        self.message = None;
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Idle => Ok(()),
            busy => Err(SessionError::Busy(busy)),
        }
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        self.message = Some(error.to_string());
        error
    }
}
