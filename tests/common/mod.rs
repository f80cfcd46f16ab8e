#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use letxbe::{
    Client, Credentials, HttpRequest, HttpResponse, LetxbeError, Provider, Session, SessionConfig,
    Transport,
};

pub const SERVER: &str = "http://letxbe.test";

/// Replays queued responses and records every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a successful login returning token `tok`.
    pub fn logged_in() -> Self {
        let transport = Self::new();
        transport.push_json(200, r#"{"access_token": "tok"}"#);
        transport
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().expect("lock").push_back(response);
    }

    pub fn push_json(&self, status: u16, body: &str) {
        self.push(HttpResponse::new(status, body).with_header("Content-Type", "application/json"));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("at least one request")
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("lock").len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, LetxbeError> {
        let url = request.url.clone();
        self.requests.lock().expect("lock").push(request);
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or(LetxbeError::Transport {
                url,
                message: "no scripted response left".to_string(),
            })
    }
}

pub fn config() -> SessionConfig {
    SessionConfig::with_server_address(SERVER).expect("valid server address")
}

pub fn session(transport: &ScriptedTransport) -> Session<&ScriptedTransport> {
    Session::connect_with(transport, &Credentials::new("id", "secret"), config())
        .expect("connect")
}

pub fn client(transport: &ScriptedTransport) -> Client<&ScriptedTransport> {
    Client::new(session(transport))
}

pub fn provider(transport: &ScriptedTransport) -> Provider<&ScriptedTransport> {
    Provider::new(session(transport), "provider-urn")
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

/// Splits a multipart body into `(part headers, content)` pairs.
pub fn multipart_parts(request: &HttpRequest) -> Vec<(String, Vec<u8>)> {
    let content_type = request.header("Content-Type").expect("content type");
    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .expect("multipart boundary");
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();
    let mut rest = request.body.as_deref().expect("body");
    loop {
        let start = find(rest, delimiter).expect("delimiter");
        rest = &rest[start + delimiter.len()..];
        if rest.starts_with(b"--") {
            break;
        }
        rest = rest.strip_prefix(b"\r\n").expect("line break after delimiter");
        let header_end = find(rest, b"\r\n\r\n").expect("part headers");
        let headers = String::from_utf8_lossy(&rest[..header_end]).into_owned();
        let content = &rest[header_end + 4..];
        let next = find(content, delimiter).expect("next delimiter");
        parts.push((headers, content[..next - 2].to_vec()));
        rest = &content[next..];
    }
    parts
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
