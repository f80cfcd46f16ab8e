//! Provider facade: claim tasks, fetch their resources, report outcomes.
//!
//! A provider is a third party processing documents with its own
//! algorithms. It takes charge of a pending task, downloads what it needs,
//! then saves its results and finishes the task.

pub mod batch;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::archive::{filename_from_content_disposition, unzip_entries, zip_entries};
use crate::error::LetxbeError;
use crate::model::{ImageFormat, LogStatus, Page, ProjectionRoot, Task};
use crate::multipart::MultipartForm;
use crate::routes::{self, DownloadResource};
use crate::session::{json_body, Session};
use crate::transport::{HttpResponse, Transport, UreqTransport};

pub use batch::{split_into_batches, SaverArg, MAX_SAVER_LIST_LEN};

/// A downloaded file and the name announced by the server, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct ResultEnvelope<R> {
    result: Vec<R>,
}

/// Provider-side access to tasks, identified by the provider's URN.
#[derive(Debug)]
pub struct Provider<T: Transport = UreqTransport> {
    session: Session<T>,
    urn: String,
}

impl<T: Transport> Provider<T> {
    pub fn new(session: Session<T>, urn: impl Into<String>) -> Self {
        Self {
            session,
            urn: urn.into(),
        }
    }

    pub fn urn(&self) -> &str {
        &self.urn
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Claims the next pending task, or returns `None` when there is no work.
    pub fn take_charge(&self) -> Result<Option<Task>, LetxbeError> {
        let response = self.session.post_empty(&routes::take_charge(&self.urn))?;
        match json_body::<JsonValue>(&response, "task")? {
            JsonValue::Object(map) if map.is_empty() => {
                debug!(provider = %self.urn, "no pending task");
                Ok(None)
            }
            value => {
                let task: Task = serde_json::from_value(value)
                    .map_err(|source| LetxbeError::json("task", source))?;
                info!(task = %task.slug, "took charge of task");
                Ok(Some(task))
            }
        }
    }

    /// Downloads the file of the task's document, or of the artefact under `role`.
    pub fn download_document_file(
        &self,
        task_slug: &str,
        role: Option<&str>,
    ) -> Result<DownloadedFile, LetxbeError> {
        self.download_file(task_slug, role, DownloadResource::File)
    }

    /// Downloads the file produced for the task by a previous service.
    pub fn download_service_file(
        &self,
        task_slug: &str,
        role: Option<&str>,
    ) -> Result<DownloadedFile, LetxbeError> {
        self.download_file(task_slug, role, DownloadResource::ServiceFile)
    }

    fn download_file(
        &self,
        task_slug: &str,
        role: Option<&str>,
        resource: DownloadResource,
    ) -> Result<DownloadedFile, LetxbeError> {
        let response = self.get_resource(task_slug, role, resource)?;
        let filename = response
            .header("content-disposition")
            .and_then(filename_from_content_disposition);
        if filename.is_none() {
            warn!(task = task_slug, %resource, "no filename in content-disposition header");
        }
        Ok(DownloadedFile {
            filename,
            bytes: response.body,
        })
    }

    /// Downloads the page images as `(filename, bytes)`, in archive order.
    pub fn download_images(
        &self,
        task_slug: &str,
        role: Option<&str>,
    ) -> Result<Vec<(String, Vec<u8>)>, LetxbeError> {
        let response = self.get_resource(task_slug, role, DownloadResource::Image)?;
        unzip_entries(&response.body)
    }

    pub fn download_pages(
        &self,
        task_slug: &str,
        role: Option<&str>,
    ) -> Result<Vec<Page>, LetxbeError> {
        let response = self.get_resource(task_slug, role, DownloadResource::Page)?;
        result_list(&response, "pages")
    }

    /// Downloads the projection roots stored under `pkey`.
    pub fn download_projections(
        &self,
        task_slug: &str,
        pkey: &str,
        role: Option<&str>,
    ) -> Result<Vec<ProjectionRoot>, LetxbeError> {
        let response = self
            .session
            .get(&routes::projection(&self.urn, task_slug, role, pkey))?;
        result_list(&response, "projections")
    }

    /// Zips `images` and uploads them as the task's page images.
    ///
    /// Entry `i` is named `{task_slug}_{batch + i}.{format}`. Every image must
    /// be encoded as `format`; this is checked before anything is sent.
    pub fn upload_images<B: AsRef<[u8]>>(
        &self,
        task_slug: &str,
        images: &[B],
        format: ImageFormat,
        batch: usize,
    ) -> Result<(), LetxbeError> {
        for (index, image) in images.iter().enumerate() {
            check_image_format(index, image.as_ref(), format)?;
        }

        let archive = zip_entries(images.iter().enumerate().map(|(index, image)| {
            (
                format!("{task_slug}_{}.{}", batch + index, format.extension()),
                image.as_ref(),
            )
        }))?;
        let form = MultipartForm::new().file("file", &format!("{task_slug}_images.zip"), &archive);

        let route = routes::resource(&self.urn, task_slug, None, DownloadResource::Image);
        self.session.post_multipart(&route, form)?;
        info!(task = task_slug, count = images.len(), "images uploaded");
        Ok(())
    }

    pub fn upload_pages(&self, task_slug: &str, pages: &[Page]) -> Result<(), LetxbeError> {
        let route = routes::resource(&self.urn, task_slug, None, DownloadResource::Page);
        self.session.post_json(&route, pages)?;
        Ok(())
    }

    /// Saves the task results, then finishes the task.
    ///
    /// `data` is split with [`split_into_batches`] and each chunk is saved in
    /// order. Nothing is sent if `data` cannot be batched. With empty `data`
    /// only the finish request is sent. The two steps are not transactional:
    /// a failure after some chunks were saved leaves them saved.
    pub fn save_and_finish(
        &self,
        task_slug: &str,
        data: &[SaverArg],
        status: LogStatus,
        text: &str,
        exception: &str,
    ) -> Result<(), LetxbeError> {
        let chunks = split_into_batches(data)?;
        let save_route = routes::save(&self.urn, task_slug);
        for (index, chunk) in chunks.iter().enumerate() {
            debug!(task = task_slug, chunk = index, total = chunks.len(), "saving chunk");
            let response = self.session.post_json(&save_route, chunk)?;
            verify_success(&response, "save")?;
        }

        let response = self.session.post_form(
            &routes::finish(&self.urn, task_slug),
            &[
                ("status_code", status.code()),
                ("text", text),
                ("exception", exception),
            ],
        )?;
        verify_success(&response, "finish")?;
        info!(task = task_slug, status = status.code(), "task finished");
        Ok(())
    }

    /// Properties of the task's document, without validation.
    pub fn properties(&self, task_slug: &str) -> Result<Map<String, JsonValue>, LetxbeError> {
        self.fetch_properties(task_slug, None)
    }

    /// Properties of the artefact connected under `role`, without validation.
    pub fn artefact_properties(
        &self,
        task_slug: &str,
        role: &str,
    ) -> Result<Map<String, JsonValue>, LetxbeError> {
        self.fetch_properties(task_slug, Some(role))
    }

    fn fetch_properties(
        &self,
        task_slug: &str,
        role: Option<&str>,
    ) -> Result<Map<String, JsonValue>, LetxbeError> {
        let response = self
            .session
            .get(&routes::task_document(&self.urn, task_slug, role))?;
        json_body(&response, "document properties")
    }

    fn get_resource(
        &self,
        task_slug: &str,
        role: Option<&str>,
        resource: DownloadResource,
    ) -> Result<HttpResponse, LetxbeError> {
        self.session
            .get(&routes::resource(&self.urn, task_slug, role, resource))
    }
}

fn result_list<R: DeserializeOwned>(
    response: &HttpResponse,
    context: &str,
) -> Result<Vec<R>, LetxbeError> {
    let envelope: ResultEnvelope<R> = json_body(response, context)?;
    Ok(envelope.result)
}

// A 200 without a `success` key is a failure of the automation.
fn verify_success(response: &HttpResponse, step: &str) -> Result<(), LetxbeError> {
    let body: Option<JsonValue> = serde_json::from_slice(&response.body).ok();
    match body {
        Some(JsonValue::Object(map)) if map.contains_key("success") => Ok(()),
        _ => Err(LetxbeError::Automation {
            reason: format!(
                "{step} response has no success marker: {}",
                String::from_utf8_lossy(&response.body)
            ),
        }),
    }
}

fn check_image_format(index: usize, bytes: &[u8], format: ImageFormat) -> Result<(), LetxbeError> {
    let kind = imagesize::image_type(bytes).map_err(|err| LetxbeError::ImageFormat {
        index,
        message: format!("unrecognized image data ({err})"),
    })?;
    if format.accepts(kind) {
        Ok(())
    } else {
        Err(LetxbeError::ImageFormat {
            index,
            message: format!("declared as {format}, found {kind:?}"),
        })
    }
}
