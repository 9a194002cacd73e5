use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::text::snippet;

/// HTTP methods the catalog can use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single call against the backend, relative to its base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer: Option<String>,
    /// Sent as JSON
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// "GET /tasks"
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Status and raw body of a completed call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Truncated body for failure details
    pub fn snippet(&self) -> String {
        snippet(&self.body)
    }
}

/// Failure to obtain any response at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

/// Transport used by the runner; one call in flight at a time
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Base URL requests are resolved against
    fn base_url(&self) -> &str;

    /// Issue the request and wait for the full response
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serde_uppercase() {
        let m: HttpMethod = serde_yaml::from_str("POST").unwrap();
        assert_eq!(m, HttpMethod::Post);
        assert_eq!(reqwest::Method::from(m), reqwest::Method::POST);
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::new(HttpMethod::Get, "/tasks").with_bearer("abc");
        assert_eq!(req.bearer.as_deref(), Some("abc"));
        assert_eq!(req.describe(), "GET /tasks");
    }
}
