use thiserror::Error;

use crate::session::SessionPhase;

/// Problems with the endpoint configuration that block a test run before any
/// request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Endpoint URL is required for testing")]
    MissingUrl,
    #[error("At least one test example is required")]
    NoExamples,
    #[error("Headers contain invalid JSON")]
    InvalidHeadersJson,
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// A test example whose text no longer parses as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("One or more test examples contain invalid JSON (example {})", .index + 1)]
pub struct ValidationError {
    /// Zero-based position of the first offending example.
    pub index: usize,
}

/// Reasons the configuration may not be submitted to the API yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("Name is required")]
    MissingName,
    #[error("Endpoint URL is required")]
    MissingUrl,
    #[error("At least one test example is required")]
    NoExamples,
    #[error("Please run tests successfully first")]
    TestsNotPassed,
    #[error(transparent)]
    InvalidExamples(#[from] ValidationError),
    #[error("Parameter schema must be a JSON object")]
    InvalidParamSchema,
    #[error("Parameter defaults must be a JSON object")]
    InvalidParamDefaults,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is busy ({0})")]
    Busy(SessionPhase),
    #[error("At least one test example is required")]
    LastExample,
    #[error("No test example at position {0}")]
    UnknownExample(usize),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Blocked(#[from] SubmitBlocked),
    #[error("Failed to {action} endpoint integration: {source}")]
    Api {
        action: &'static str,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read session file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write session file `{path}`: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse session file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize session: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for {key}: {reason}")]
pub struct SettingsError {
    pub key: &'static str,
    pub reason: String,
}
