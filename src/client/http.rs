//! reqwest-backed transport
//!
//! Resolves catalog paths against the configured API root, attaches the bearer
//! token and JSON body, and enforces the per-call timeout.

use async_trait::async_trait;
use log::debug;
use std::time::{Duration, Instant};

use super::traits::{ApiRequest, ApiResponse, ApiTransport, TransportError};

pub struct HttpTransport {
    /// API root without trailing slash (e.g. "https://host/api")
    base_url: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            client,
        })
    }

    /// Join the base URL and a catalog path with exactly one '/'
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout_ms)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        let started = Instant::now();

        let mut req = self.client.request(request.method.into(), &url);
        if let Some(token) = &request.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            // Also sets Content-Type: application/json
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| self.classify(e))?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| self.classify(e))?;

        debug!(
            "{} {} -> {} ({}ms, {} bytes)",
            request.method,
            url,
            status,
            started.elapsed().as_millis(),
            body.len()
        );

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let transport = HttpTransport::new("http://localhost:8001/api/", 1000).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8001/api");
        assert_eq!(
            transport.url_for("/auth/login"),
            "http://localhost:8001/api/auth/login"
        );
        assert_eq!(
            transport.url_for("tasks/counts"),
            "http://localhost:8001/api/tasks/counts"
        );
    }
}
