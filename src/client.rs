//! Consumer facade: upload documents, post predictions and feedback.

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::LetxbeError;
use crate::model::{Document, Feedback, FeedbackResponse, Metadata, Prediction, Slug};
use crate::multipart::MultipartForm;
use crate::routes;
use crate::session::{json_body, Session};
use crate::transport::{Transport, UreqTransport};

/// A file attached to an uploaded document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Upload<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> Upload<'a> {
    pub fn new(filename: &'a str, bytes: &'a [u8]) -> Self {
        Self { filename, bytes }
    }
}

/// Consumer-side access to an automatisme's documents.
///
/// Every call is a single request; failures are returned as they come.
#[derive(Debug)]
pub struct Client<T: Transport = UreqTransport> {
    session: Session<T>,
}

impl<T: Transport> Client<T> {
    pub fn new(session: Session<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Uploads a target document and returns its slug.
    ///
    /// Each call creates a new document, unless `slug` is given; what happens
    /// when that slug is taken is up to the server.
    ///
    /// The document exists once the server answers. If the slug it returns is
    /// not a valid [`Slug`], the call fails with
    /// [`LetxbeError::UnexpectedResponse`] carrying the raw slug, so the
    /// document can still be looked up.
    pub fn post_target(
        &self,
        workflow_id: &str,
        metadata: &Metadata,
        file: Option<Upload<'_>>,
        slug: Option<&Slug>,
    ) -> Result<Slug, LetxbeError> {
        self.post_document(&routes::post_target(workflow_id), metadata, file, slug)
    }

    /// Uploads an artefact under `role` and returns its slug.
    pub fn post_artefact(
        &self,
        workflow_id: &str,
        role: &str,
        metadata: &Metadata,
        file: Option<Upload<'_>>,
        slug: Option<&Slug>,
    ) -> Result<Slug, LetxbeError> {
        if role.is_empty() {
            return Err(LetxbeError::EmptyRole);
        }
        self.post_document(&routes::post_artefact(workflow_id, role), metadata, file, slug)
    }

    fn post_document(
        &self,
        route: &str,
        metadata: &Metadata,
        file: Option<Upload<'_>>,
        slug: Option<&Slug>,
    ) -> Result<Slug, LetxbeError> {
        let mut metadata = serde_json::to_value(metadata)
            .map_err(|source| LetxbeError::json("document metadata", source))?;
        if let (Some(slug), JsonValue::Object(fields)) = (slug, &mut metadata) {
            fields.insert("slug".to_string(), JsonValue::String(slug.to_string()));
        }

        let mut form = MultipartForm::new().text("metadata", &metadata.to_string());
        if let Some(file) = file {
            form = form.file("file", file.filename, file.bytes);
        }

        let response = self.session.post_multipart(route, form)?;
        let raw: String = json_body(&response, "uploaded document slug")?;
        let slug = Slug::new(raw.as_str()).map_err(|_| {
            warn!(slug = %raw, "document uploaded under an invalid slug");
            LetxbeError::UnexpectedResponse {
                context: "uploaded document slug".to_string(),
                message: format!("document created with invalid slug '{raw}'"),
            }
        })?;
        info!(slug = %slug, "document uploaded");
        Ok(slug)
    }

    /// Attaches a prediction to an existing document.
    pub fn post_prediction(
        &self,
        workflow_id: &str,
        document_slug: &str,
        prediction: &Prediction,
    ) -> Result<(), LetxbeError> {
        self.session
            .post_json(&routes::post_prediction(workflow_id, document_slug), prediction)?;
        Ok(())
    }

    /// Sends feedback and returns the ids of the labels it changed.
    pub fn post_feedback(
        &self,
        workflow_id: &str,
        document_slug: &str,
        feedback: &Feedback,
    ) -> Result<FeedbackResponse, LetxbeError> {
        let response = self
            .session
            .post_json(&routes::post_feedback(workflow_id, document_slug), feedback)?;
        json_body(&response, "feedback response")
    }

    /// Fetches a document, as a target or an artefact depending on its `role`.
    pub fn get_document(
        &self,
        workflow_id: &str,
        document_slug: &str,
    ) -> Result<Document, LetxbeError> {
        let response = self
            .session
            .get(&routes::document(workflow_id, document_slug))?;
        Document::from_json_slice(&response.body)
    }
}
