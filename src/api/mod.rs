//! # Evaluation Platform API
//!
//! REST calls that persist validated endpoint integrations.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{CreateIntegration, DeleteResponse, EndpointIntegration, UpdateIntegration};
