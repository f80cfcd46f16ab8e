//! Route templates of the platform API.
//!
//! Every function returns a path relative to the server address. Caller
//! values (workflow ids, slugs, roles, projection keys) are percent-encoded,
//! so each one stays a single path segment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exchanges client credentials for a bearer token.
pub const LOGIN: &str = "/api/get_m2m_token";

/// Kind of resource downloadable for a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadResource {
    File,
    Page,
    Projection,
    Image,
    ServiceFile,
}

impl DownloadResource {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadResource::File => "file",
            DownloadResource::Page => "page",
            DownloadResource::Projection => "projection",
            DownloadResource::Image => "image",
            DownloadResource::ServiceFile => "service_file",
        }
    }
}

impl fmt::Display for DownloadResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encodes `value` for use as one path segment.
///
/// Only ASCII alphanumerics and `*-._` are left as is.
pub fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .map(|chunk| if chunk == "+" { "%20" } else { chunk })
        .collect()
}

fn automatisme(workflow_id: &str) -> String {
    format!("/api/automatisme/{}", segment(workflow_id))
}

pub fn post_target(workflow_id: &str) -> String {
    format!("{}/document", automatisme(workflow_id))
}

pub fn post_artefact(workflow_id: &str, role: &str) -> String {
    format!("{}/role/{}/document", automatisme(workflow_id), segment(role))
}

pub fn document(workflow_id: &str, document_slug: &str) -> String {
    format!("{}/document/{}", automatisme(workflow_id), segment(document_slug))
}

pub fn post_prediction(workflow_id: &str, document_slug: &str) -> String {
    format!("{}/prediction", document(workflow_id, document_slug))
}

pub fn post_feedback(workflow_id: &str, document_slug: &str) -> String {
    format!("{}/feedback", document(workflow_id, document_slug))
}

pub fn take_charge(provider: &str) -> String {
    format!("/api/provider/{}/task", segment(provider))
}

fn task(provider: &str, task_slug: &str) -> String {
    format!("{}/{}", take_charge(provider), segment(task_slug))
}

pub fn save(provider: &str, task_slug: &str) -> String {
    format!("{}/save", task(provider, task_slug))
}

pub fn finish(provider: &str, task_slug: &str) -> String {
    format!("{}/finish", task(provider, task_slug))
}

/// Properties of the task's document, or of the artefact under `role`.
pub fn task_document(provider: &str, task_slug: &str, role: Option<&str>) -> String {
    match role {
        None => format!("{}/document", task(provider, task_slug)),
        Some(role) => format!(
            "{}/role/{}/document",
            task(provider, task_slug),
            segment(role)
        ),
    }
}

pub fn resource(
    provider: &str,
    task_slug: &str,
    role: Option<&str>,
    resource: DownloadResource,
) -> String {
    match role {
        None => format!("{}/resource/{resource}", task(provider, task_slug)),
        Some(role) => format!(
            "{}/role/{}/resource/{resource}",
            task(provider, task_slug),
            segment(role)
        ),
    }
}

pub fn projection(provider: &str, task_slug: &str, role: Option<&str>, pkey: &str) -> String {
    format!(
        "{}/projection/{}",
        resource(provider, task_slug, role, DownloadResource::Projection),
        segment(pkey)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_routes() {
        assert_eq!(post_target("wf"), "/api/automatisme/wf/document");
        assert_eq!(post_artefact("wf", "po"), "/api/automatisme/wf/role/po/document");
        assert_eq!(
            post_prediction("wf", "doc"),
            "/api/automatisme/wf/document/doc/prediction"
        );
        assert_eq!(
            post_feedback("wf", "doc"),
            "/api/automatisme/wf/document/doc/feedback"
        );
        assert_eq!(document("wf", "doc"), "/api/automatisme/wf/document/doc");
    }

    #[test]
    fn test_provider_routes() {
        assert_eq!(take_charge("p"), "/api/provider/p/task");
        assert_eq!(save("p", "t"), "/api/provider/p/task/t/save");
        assert_eq!(finish("p", "t"), "/api/provider/p/task/t/finish");
        assert_eq!(task_document("p", "t", None), "/api/provider/p/task/t/document");
        assert_eq!(
            task_document("p", "t", Some("r")),
            "/api/provider/p/task/t/role/r/document"
        );
        assert_eq!(
            resource("p", "t", None, DownloadResource::ServiceFile),
            "/api/provider/p/task/t/resource/service_file"
        );
        assert_eq!(
            resource("p", "t", Some("r"), DownloadResource::Image),
            "/api/provider/p/task/t/role/r/resource/image"
        );
        assert_eq!(
            projection("p", "t", None, "lines"),
            "/api/provider/p/task/t/resource/projection/projection/lines"
        );
        assert_eq!(
            projection("p", "t", Some("r"), "lines"),
            "/api/provider/p/task/t/role/r/resource/projection/projection/lines"
        );
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        assert_eq!(segment("purchase-order"), "purchase-order");
        assert_eq!(segment("a/b c?d+e"), "a%2Fb%20c%3Fd%2Be");
        assert_eq!(
            post_artefact("wf", "../admin"),
            "/api/automatisme/wf/role/..%2Fadmin/document"
        );
        assert_eq!(
            projection("urn:p", "t", Some("r 1"), "lines?all"),
            "/api/provider/urn%3Ap/task/t/role/r%201/resource/projection/projection/lines%3Fall"
        );
    }
}
