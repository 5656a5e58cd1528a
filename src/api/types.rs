use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::http::method::HttpMethod;

/// Body of a create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIntegration {
    pub name: String,
    pub endpoint_url: String,
    pub http_method: HttpMethod,
    pub param_schema: Map<String, Value>,
    pub param_defaults: Map<String, Value>,
    pub test_examples: Vec<Value>,
    pub eval_id: Uuid,
}

/// Body of an update call. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateIntegration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_schema: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_defaults: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_examples: Option<Vec<Value>>,
}

/// A persisted endpoint integration as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointIntegration {
    pub id: Uuid,
    pub name: String,
    pub endpoint_url: String,
    pub http_method: HttpMethod,
    #[serde(default)]
    pub param_schema: Map<String, Value>,
    #[serde(default)]
    pub param_defaults: Map<String, Value>,
    #[serde(default)]
    pub test_examples: Vec<Value>,
    pub eval_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}
