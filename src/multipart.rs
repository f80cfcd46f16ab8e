//! `multipart/form-data` encoding of document uploads.

use rand::RngExt;

const BOUNDARY_PREFIX: &str = "letxbe-boundary-";
const BOUNDARY_RANDOM_LEN: usize = 24;

/// A multipart body under construction.
#[derive(Clone, Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Creates an empty form with a random boundary.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..BOUNDARY_RANDOM_LEN)
            .map(|_| {
                let digit = rng.random_range(0..16u32);
                char::from_digit(digit, 16).unwrap_or('0')
            })
            .collect();
        Self::with_boundary(format!("{BOUNDARY_PREFIX}{suffix}"))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Adds a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!("form-data; name=\"{}\"", escape(name)), None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a file field sent as `application/octet-stream`.
    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.open_part(
            &format!(
                "form-data; name=\"{}\"; filename=\"{}\"",
                escape(name),
                escape(filename)
            ),
            Some("application/octet-stream"),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body
            .extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        if let Some(content_type) = content_type {
            self.body
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.body.extend_from_slice(b"\r\n");
    }

    /// Value of the `Content-Type` header matching this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Closes the form and returns the encoded body.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}
