//! Test-and-validate workflow for evaluation-platform endpoint integrations.
//!
//! An [`EditingSession`](session::EditingSession) holds an endpoint
//! configuration and its example payloads. The
//! [`EndpointTestHarness`](testing::EndpointTestHarness) runs the examples
//! against the live endpoint, and once one of them passes the configuration
//! can be submitted through the [`ApiClient`](api::ApiClient).

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod integration;
pub mod session;
pub mod storage;
pub mod testing;
