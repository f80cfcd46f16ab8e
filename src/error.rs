use thiserror::Error;

/// The main error type for letxbe operations.
///
/// HTTP failures are mapped onto a flat taxonomy by status code (see
/// [`verify_status`](crate::session::verify_status)).
/// None of them are retried.
#[derive(Debug, Error)]
pub enum LetxbeError {
    /// Invalid credentials or forbidden access (401/403).
    #[error("Authorization failed ({status}): {reason}")]
    Authorization { status: u16, reason: String },

    /// The referenced document, task or resource does not exist (404).
    #[error("Unknown resource: {reason}")]
    UnknownResource { reason: String },

    /// Server-side failure (500), or a response missing its `success` marker.
    #[error("Automation error: {reason}")]
    Automation { reason: String },

    /// Any other non-200 status.
    #[error("Request failed with code {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid server address '{input}': {source}")]
    InvalidServerAddress {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to process JSON for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected response for {context}: {message}")]
    UnexpectedResponse { context: String, message: String },

    #[error("Error with slug '{slug}': only ASCII letters, digits and '-' are allowed")]
    InvalidSlug { slug: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid polygon: {message}")]
    InvalidPolygon { message: String },

    #[error("Invalid result structure at '{path}': {message}")]
    ResultShape { path: String, message: String },

    #[error("Artefact role must not be empty")]
    EmptyRole,

    #[error("Values do not share the same type: '{left}', '{right}'")]
    ValueMismatch { left: String, right: String },

    #[error("Element at position {position} cannot be saved: expected an object or a list, found {found}")]
    UnbatchableElement { position: usize, found: &'static str },

    #[error("Image {index} cannot be uploaded: {message}")]
    ImageFormat { index: usize, message: String },

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LetxbeError {
    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Returns true for failures detected locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSlug { .. }
                | Self::OutOfRange { .. }
                | Self::InvalidPolygon { .. }
                | Self::ResultShape { .. }
                | Self::EmptyRole
                | Self::ValueMismatch { .. }
                | Self::UnbatchableElement { .. }
                | Self::ImageFormat { .. }
        )
    }
}
