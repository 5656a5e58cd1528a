use serde_json::{Map, Value};

use crate::error::{SubmitBlocked, ValidationError};
use crate::integration::{EndpointConfig, TestExample};

/// Everything the API needs, parsed out of the form text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub param_schema: Map<String, Value>,
    pub param_defaults: Map<String, Value>,
    pub test_examples: Vec<Value>,
}

/// Re-parse every example, stopping at the first one that is not JSON.
pub fn validate_examples(examples: &[TestExample]) -> Result<Vec<Value>, ValidationError> {
    examples
        .iter()
        .enumerate()
        .map(|(index, example)| {
            serde_json::from_str(&example.input).map_err(|_| ValidationError { index })
        })
        .collect()
}

/// Check every submission precondition in order, returning the first one
/// that does not hold.
pub fn check_submit(
    config: &EndpointConfig,
    examples: &[TestExample],
    has_successful_test: bool,
) -> Result<ValidatedSubmission, SubmitBlocked> {
    if config.name.trim().is_empty() {
        return Err(SubmitBlocked::MissingName);
    }
    if config.url.trim().is_empty() {
        return Err(SubmitBlocked::MissingUrl);
    }
    if examples.is_empty() {
        return Err(SubmitBlocked::NoExamples);
    }
    if !has_successful_test {
        return Err(SubmitBlocked::TestsNotPassed);
    }
    let test_examples = validate_examples(examples)?;
    let param_schema = parse_object(&config.param_schema).ok_or(SubmitBlocked::InvalidParamSchema)?;
    let param_defaults =
        parse_object(&config.param_defaults).ok_or(SubmitBlocked::InvalidParamDefaults)?;

    Ok(ValidatedSubmission {
        param_schema,
        param_defaults,
        test_examples,
    })
}

pub fn can_submit(config: &EndpointConfig, examples: &[TestExample], has_successful_test: bool) -> bool {
    check_submit(config, examples, has_successful_test).is_ok()
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
