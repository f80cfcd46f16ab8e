//! Authenticated session: token handshake, bearer header and status mapping.
//!
//! A [`Session`] is created by a successful handshake and holds its token for
//! its whole lifetime. There is no refresh: when the token expires, connect a
//! new session.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::{Credentials, SessionConfig};
use crate::error::LetxbeError;
use crate::multipart::MultipartForm;
use crate::routes;
use crate::transport::{HttpRequest, HttpResponse, Transport, UreqTransport};

/// Maps a response status onto the error taxonomy.
///
/// | Status | Result |
/// |---|---|
/// | 200 | `Ok(())` |
/// | 401, 403 | [`LetxbeError::Authorization`] |
/// | 404 | [`LetxbeError::UnknownResource`] |
/// | 500 | [`LetxbeError::Automation`] |
/// | other | [`LetxbeError::Http`] |
pub fn verify_status(response: &HttpResponse) -> Result<(), LetxbeError> {
    let reason = || response.reason_or_body();
    match response.status {
        200 => Ok(()),
        401 | 403 => Err(LetxbeError::Authorization {
            status: response.status,
            reason: reason(),
        }),
        404 => Err(LetxbeError::UnknownResource { reason: reason() }),
        500 => Err(LetxbeError::Automation { reason: reason() }),
        status => Err(LetxbeError::Http {
            status,
            reason: reason(),
        }),
    }
}

/// Parses a JSON response body.
pub(crate) fn json_body<R: DeserializeOwned>(
    response: &HttpResponse,
    context: &str,
) -> Result<R, LetxbeError> {
    serde_json::from_slice(&response.body).map_err(|source| LetxbeError::json(context, source))
}

/// An authenticated connection to the platform.
pub struct Session<T: Transport = UreqTransport> {
    transport: T,
    config: SessionConfig,
    token: String,
}

impl Session<UreqTransport> {
    /// Connects over HTTP with the default [`UreqTransport`].
    pub fn connect(credentials: &Credentials, config: SessionConfig) -> Result<Self, LetxbeError> {
        Self::connect_with(UreqTransport::new(), credentials, config)
    }
}

impl<T: Transport> Session<T> {
    /// Exchanges `credentials` for a bearer token through `transport`.
    ///
    /// Fails with [`LetxbeError::Authorization`] when the server answers 401
    /// or 403. Otherwise the body must hold an `access_token` string.
    pub fn connect_with(
        transport: T,
        credentials: &Credentials,
        config: SessionConfig,
    ) -> Result<Self, LetxbeError> {
        let body = serde_json::to_vec(credentials)
            .map_err(|source| LetxbeError::json("login request", source))?;
        let request = HttpRequest::post(config.url_for(routes::LOGIN))
            .with_body("application/json", body);

        debug!(server = config.server_address(), "requesting access token");
        let response = transport.send(request)?;

        if matches!(response.status, 401 | 403) {
            warn!(status = response.status, "credentials rejected");
            return Err(LetxbeError::Authorization {
                status: response.status,
                reason: format!("Invalid credentials: {}", response.reason_or_body()),
            });
        }

        let token = extract_access_token(&response)?;
        info!(server = config.server_address(), "session connected");
        Ok(Self {
            transport,
            config,
            token,
        })
    }

    /// Base address requests are sent to.
    pub fn server(&self) -> &str {
        self.config.server_address()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The `Authorization: Bearer <token>` header.
    pub fn authorization_header(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }

    /// Sends an authenticated GET and checks the status.
    pub fn get(&self, path: &str) -> Result<HttpResponse, LetxbeError> {
        self.send(HttpRequest::get(self.config.url_for(path)))
    }

    /// Sends an authenticated POST with no body and checks the status.
    pub fn post_empty(&self, path: &str) -> Result<HttpResponse, LetxbeError> {
        self.send(HttpRequest::post(self.config.url_for(path)))
    }

    /// Sends `body` as JSON.
    pub fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse, LetxbeError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|source| LetxbeError::json(format!("request body of {path}"), source))?;
        self.send(HttpRequest::post(self.config.url_for(path)).with_body("application/json", bytes))
    }

    /// Sends `pairs` as an `application/x-www-form-urlencoded` body.
    pub fn post_form(&self, path: &str, pairs: &[(&str, &str)]) -> Result<HttpResponse, LetxbeError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.send(
            HttpRequest::post(self.config.url_for(path))
                .with_body("application/x-www-form-urlencoded", body.into_bytes()),
        )
    }

    pub fn post_multipart(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<HttpResponse, LetxbeError> {
        let content_type = form.content_type();
        self.send(HttpRequest::post(self.config.url_for(path)).with_body(content_type, form.finish()))
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, LetxbeError> {
        let (name, value) = self.authorization_header();
        let request = request.with_header(name, value);
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let response = self.transport.send(request)?;
        if let Err(err) = verify_status(&response) {
            debug!(status = response.status, error = %err, "request failed");
            return Err(err);
        }
        Ok(response)
    }
}

fn extract_access_token(response: &HttpResponse) -> Result<String, LetxbeError> {
    let body: JsonValue = json_body(response, "login response")?;
    body.get("access_token")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| LetxbeError::UnexpectedResponse {
            context: "login".to_string(),
            message: format!("status {} without an access_token", response.status),
        })
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("server", &self.config.server_address())
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
