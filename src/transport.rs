//! HTTP collaborator behind the [`Session`](crate::session::Session).
//!
//! The session builds [`HttpRequest`]s and maps [`HttpResponse`]s; sending
//! them is delegated to a [`Transport`]. [`UreqTransport`] is the default,
//! blocking implementation. Tests plug in a scripted transport instead.

use tracing::debug;

use crate::error::LetxbeError;

/// Upper bound on the size of a response body read into memory.
pub const MAX_RESPONSE_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully built request: method, absolute URL, headers and optional body.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body along with its `Content-Type`.
    pub fn with_body(self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        let mut request = self.with_header("Content-Type", content_type);
        request.body = Some(body);
        request
    }

    /// Returns the first header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

// Bodies and the Authorization header are left out.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase of the status, used in error messages.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Text used to describe a failed response: the reason phrase, or the body.
    pub fn reason_or_body(&self) -> String {
        if self.reason.is_empty() {
            String::from_utf8_lossy(&self.body).into_owned()
        } else {
            self.reason.clone()
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends requests and returns raw responses.
///
/// Implementations must not map HTTP statuses to errors: any response
/// received, whatever its status, is returned as `Ok`. Errors are for
/// requests that could not complete.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, LetxbeError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, LetxbeError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by a [`ureq::Agent`].
#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }

    /// Wraps an agent built elsewhere, e.g. with a proxy or timeouts.
    ///
    /// The agent must be configured with `http_status_as_error(false)`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, LetxbeError> {
        let transport_error = |source: ureq::Error| LetxbeError::Transport {
            url: request.url.clone(),
            message: source.to_string(),
        };

        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(&body[..]),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(transport_error)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(transport_error)?;

        debug!(
            method = request.method.as_str(),
            status = status.as_u16(),
            bytes = body.len(),
            "received response"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("http://localhost/api")
            .with_header("Authorization", "Bearer tok")
            .with_body("application/json", b"{}".to_vec());
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_request_debug_hides_headers_and_body() {
        let request = HttpRequest::get("http://localhost/api").with_header("Authorization", "Bearer secret");
        let debug = format!("{request:?}");
        assert!(debug.contains("http://localhost/api"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_reason_falls_back_to_body() {
        let response = HttpResponse::new(418, "short and stout");
        assert_eq!(response.reason_or_body(), "short and stout");
        let response = response.with_reason("I'm a teapot");
        assert_eq!(response.reason_or_body(), "I'm a teapot");
    }
}
