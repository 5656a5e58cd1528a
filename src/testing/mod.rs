//! # Endpoint Testing
//!
//! Runs test examples against an endpoint configuration and decides whether
//! the configuration is ready to be submitted.
//!
//! - Examples run strictly one after another, in list order
//! - Per-example failures are recorded, never raised
//! - Submission requires at least one passing example

mod gate;
mod harness;

pub use gate::{can_submit, check_submit, validate_examples, ValidatedSubmission};
pub use harness::{check_run_target, parse_headers_template, EndpointTestHarness};

#[cfg(test)]
pub(crate) use harness::tests as fixtures;

use serde::Serialize;

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u128,
}

/// What a finished run hands back besides the results written into the
/// example list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub has_successful_test: bool,
    pub report: RunReport,
}
