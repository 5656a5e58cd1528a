use reqwest::header::HeaderMap;

use super::method::HttpMethod;

/// One fully-resolved outbound request.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}
