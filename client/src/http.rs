//! HTTP plumbing: requests and responses as plain data, plus the transport
//! seam that executes them.
//!
//! # Design
//! `ApiClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; the `Transport` trait is the only place I/O
//! happens. Production code uses [`UreqTransport`]; service unit tests swap
//! in an in-process fake to script responses and assert that no request is
//! sent when a precondition fails.

use thiserror::Error;

use crate::error::ApiError;

/// HTTP method for a request. The API only ever uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data. `path` is the full URL including
/// the `apikey` query parameter.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Failure to complete the HTTP round-trip: no response was received.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Network(err.0)
    }
}

/// Executes an [`HttpRequest`] and returns the raw [`HttpResponse`].
///
/// Implementations must return non-2xx responses as data, not as errors;
/// status interpretation belongs to the client's parse methods.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default [`Transport`] backed by a blocking ureq agent.
///
/// ureq's status-code-as-error behavior is disabled so 4xx/5xx responses come
/// back as data. Timeouts and connection handling are the agent's defaults.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        log::debug!("{} {}", request.method.as_str(), request.path);

        let result = match request.method {
            HttpMethod::Get => {
                let mut req = self.agent.get(&request.path);
                for (name, value) in &request.headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call()
            }
            HttpMethod::Post => {
                let mut req = self.agent.post(&request.path);
                for (name, value) in &request.headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => req.send(body.as_bytes()),
                    None => req.send_empty(),
                }
            }
            HttpMethod::Put => {
                let mut req = self.agent.put(&request.path);
                for (name, value) in &request.headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => req.send(body.as_bytes()),
                    None => req.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;
        log::debug!("{} {} -> {status}", request.method.as_str(), request.path);

        Ok(HttpResponse { status, body })
    }
}
