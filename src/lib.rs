//! letxbe: typed client for the letxbe document-processing platform.
//!
//! Consumers upload documents ("targets") and their attachments
//! ("artefacts"), then post predictions and feedback. Providers claim
//! tasks, download the resources of a task, and report their results.
//!
//! # Modules
//!
//! - [`model`]: Validated data model (documents, labels, clues, results, pages, projections)
//! - [`session`]: Authentication handshake and HTTP status mapping
//! - [`client`]: Consumer facade
//! - [`provider`]: Provider facade and result batching
//! - [`transport`]: HTTP collaborator seam and its `ureq` implementation
//! - [`error`]: Error types for letxbe operations
//!
//! # Example
//!
//! ```no_run
//! use letxbe::{Client, Credentials, Metadata, Session, SessionConfig};
//!
//! let credentials = Credentials::new("client-id", "client-secret");
//! let session = Session::connect(&credentials, SessionConfig::from_env()?)?;
//! let client = Client::new(session);
//! let slug = client.post_target("my-workflow", &Metadata::new(), None, None)?;
//! println!("uploaded {slug}");
//! # Ok::<(), letxbe::LetxbeError>(())
//! ```

pub mod archive;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod multipart;
pub mod provider;
pub mod routes;
pub mod session;
pub mod transport;

pub use client::{Client, Upload};
pub use config::{Credentials, SessionConfig, DEFAULT_SERVER_ADDRESS};
pub use error::LetxbeError;
pub use model::{
    Document, Feedback, FeedbackResponse, Metadata, Page, Prediction, ProjectionRoot, Slug, Task,
};
pub use provider::{DownloadedFile, Provider, SaverArg};
pub use session::{verify_status, Session};
pub use transport::{HttpRequest, HttpResponse, Transport, UreqTransport};
