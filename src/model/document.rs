//! Documents: targets, artefacts and the metadata shared when uploading them.
//!
//! A [`Target`] is processed to produce predictions. An [`Artefact`] brings
//! extra information to targets and is attached to them under a `role`. Both
//! embed the same [`DocumentInfo`]; the wire format has no tag, so
//! [`Document::from_json`] tells them apart by the presence of a non-null
//! `role` key.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::ids::Slug;
use super::results::{Current, Feedback, Prediction};
use super::value::Value;
use crate::error::LetxbeError;

/// Environment a document is sent to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientEnv {
    #[default]
    Test,
    Prod,
}

/// Processing status of a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Interrupted by the platform or a developer.
    #[serde(rename = "101")]
    Hold,
    /// Some information is missing before processing can start.
    #[serde(rename = "102")]
    Waiting,
    #[default]
    #[serde(rename = "103")]
    Processing,
    #[serde(rename = "200")]
    Success,
    #[serde(rename = "500")]
    Error,
}

impl DocumentStatus {
    /// The wire code of the status.
    pub fn code(self) -> &'static str {
        match self {
            DocumentStatus::Hold => "101",
            DocumentStatus::Waiting => "102",
            DocumentStatus::Processing => "103",
            DocumentStatus::Success => "200",
            DocumentStatus::Error => "500",
        }
    }
}

/// Latest processing step completed on a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCode {
    /// The document was read and its content saved.
    Projection,
    /// A prediction is available.
    Prediction,
    /// An external action was triggered.
    Repercussion,
}

/// A value of a [`Form`]: a scalar, a list of scalars, or a nested form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Scalar(Option<Value>),
    List(Vec<Option<Value>>),
    Nested(BTreeMap<String, FormValue>),
}

macro_rules! scalar_form_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FormValue {
                fn from(value: $ty) -> Self {
                    FormValue::Scalar(Some(value.into()))
                }
            }
        )*
    };
}

scalar_form_value!(Value, bool, i32, i64, f64, &str, String);

/// Information known about a document when uploading it.
///
/// Used to pass options to a model, or to describe a document completely
/// when no file is attached.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub result: BTreeMap<String, FormValue>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.result.insert(key.into(), value.into());
        self
    }
}

/// Identifies an existing artefact to connect to an uploaded document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtefactToConnect {
    pub slug: Slug,
}

/// Information shared about a document when uploading it.
///
/// `name` overrides the file name and should not end with an extension.
/// `extension` is empty when no file is attached. Keys of `artefact` are the
/// roles configured for the automatisme.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub client_env: ClientEnv,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub form: Form,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub artefact: BTreeMap<String, ArtefactToConnect>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_env(mut self, client_env: ClientEnv) -> Self {
        self.client_env = client_env;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = form;
        self
    }

    /// Connects the uploaded document to the artefact `slug` under `role`.
    pub fn connect_artefact(mut self, role: impl Into<String>, slug: Slug) -> Self {
        self.artefact.insert(role.into(), ArtefactToConnect { slug });
        self
    }
}

fn all_pages_filtered_out() -> Option<Vec<i64>> {
    Some(Vec::new())
}

/// Lineage of a document extracted from a parent document.
///
/// `content` lists the `page_idx` of the parent pages kept in the child:
/// `Some(vec![])` keeps none, `None` keeps them all. `projection` does the
/// same with projection `xid`s, keyed by `pkey`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentDocument {
    pub atms_slug: String,
    pub doc_slug: String,
    #[serde(default = "all_pages_filtered_out")]
    pub content: Option<Vec<i64>>,
    #[serde(default)]
    pub projection: BTreeMap<String, Option<Vec<String>>>,
}

/// Fields shared by every document variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub slug: Slug,
    pub urn: String,
    pub name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub client_env: ClientEnv,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub form: Form,
    #[serde(default)]
    pub status_code: DocumentStatus,
    #[serde(default)]
    pub action_code: Option<ActionCode>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentDocument>,
}

fn non_empty_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;

    let role = String::deserialize(deserializer)?;
    if role.is_empty() {
        Err(D::Error::custom(LetxbeError::EmptyRole))
    } else {
        Ok(role)
    }
}

/// An artefact as seen from a document it is connected to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectedArtefact {
    #[serde(flatten)]
    pub info: DocumentInfo,
    #[serde(deserialize_with = "non_empty_role")]
    pub role: String,
}

/// A document sent to get predictions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(flatten)]
    pub info: DocumentInfo,
    #[serde(default)]
    pub prediction: Prediction,
    /// Confirmations, deletions or corrections of `prediction`.
    #[serde(default)]
    pub feedback: Option<Feedback>,
    /// `prediction` with `feedback` applied.
    #[serde(default)]
    pub current: Current,
    #[serde(default)]
    pub artefact: BTreeMap<String, ConnectedArtefact>,
}

/// A document accessed directly, attached to targets under `role`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artefact {
    #[serde(flatten)]
    pub info: DocumentInfo,
    #[serde(deserialize_with = "non_empty_role")]
    pub role: String,
    #[serde(default)]
    pub prediction: Prediction,
    #[serde(default)]
    pub artefact: BTreeMap<String, ConnectedArtefact>,
}

/// Either kind of document returned by the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Target(Target),
    Artefact(Artefact),
}

impl Document {
    /// Parses a document, picking [`Artefact`] when `role` is present and not null.
    pub fn from_json(value: JsonValue) -> Result<Self, LetxbeError> {
        let is_artefact = value.get("role").is_some_and(|role| !role.is_null());
        if is_artefact {
            serde_json::from_value(value)
                .map(Document::Artefact)
                .map_err(|source| LetxbeError::json("artefact document", source))
        } else {
            serde_json::from_value(value)
                .map(Document::Target)
                .map_err(|source| LetxbeError::json("target document", source))
        }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LetxbeError> {
        let value: JsonValue =
            serde_json::from_slice(bytes).map_err(|source| LetxbeError::json("document", source))?;
        Self::from_json(value)
    }

    pub fn info(&self) -> &DocumentInfo {
        match self {
            Document::Target(target) => &target.info,
            Document::Artefact(artefact) => &artefact.info,
        }
    }

    pub fn slug(&self) -> &Slug {
        &self.info().slug
    }

    /// The artefact role, or `None` for a target.
    pub fn role(&self) -> Option<&str> {
        match self {
            Document::Target(_) => None,
            Document::Artefact(artefact) => Some(&artefact.role),
        }
    }

    pub fn as_target(&self) -> Option<&Target> {
        match self {
            Document::Target(target) => Some(target),
            Document::Artefact(_) => None,
        }
    }

    pub fn as_artefact(&self) -> Option<&Artefact> {
        match self {
            Document::Target(_) => None,
            Document::Artefact(artefact) => Some(artefact),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = JsonValue::deserialize(deserializer)?;
        Document::from_json(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document_json() -> JsonValue {
        json!({
            "slug": "doc-1",
            "urn": "urn:letxbe:doc-1",
            "name": "invoice",
            "extension": "pdf",
            "client_env": "prod",
            "created_at": 1640995200000_i64,
            "status_code": "200",
            "action_code": "prediction",
            "form": {"result": {"amount": 12.5, "tags": ["a", null], "address": {"city": "Paris"}}}
        })
    }

    #[test]
    fn test_document_without_role_is_a_target() {
        let document = Document::from_json(document_json()).unwrap();
        let target = document.as_target().expect("target");
        assert_eq!(target.info.slug.as_str(), "doc-1");
        assert_eq!(target.info.status_code, DocumentStatus::Success);
        assert_eq!(target.info.action_code, Some(ActionCode::Prediction));
        assert!(target.feedback.is_none());
        assert!(document.role().is_none());

        let mut with_null_role = document_json();
        with_null_role["role"] = JsonValue::Null;
        assert!(matches!(
            Document::from_json(with_null_role).unwrap(),
            Document::Target(_)
        ));
    }

    #[test]
    fn test_document_with_role_is_an_artefact() {
        let mut value = document_json();
        value["role"] = json!("purchase-order");
        let document = Document::from_json(value).unwrap();
        assert_eq!(document.role(), Some("purchase-order"));
        assert!(document.as_artefact().is_some());
    }

    #[test]
    fn test_empty_role_is_rejected() {
        let mut value = document_json();
        value["role"] = json!("");
        assert!(Document::from_json(value).is_err());
    }

    #[test]
    fn test_invalid_slug_is_rejected() {
        let mut value = document_json();
        value["slug"] = json!("not a slug");
        assert!(matches!(
            Document::from_json(value),
            Err(LetxbeError::Json { .. })
        ));
    }

    #[test]
    fn test_form_values() {
        let document = Document::from_json(document_json()).unwrap();
        let form = &document.info().form.result;
        assert_eq!(form["amount"], FormValue::Scalar(Some(Value::Float(12.5))));
        assert_eq!(
            form["tags"],
            FormValue::List(vec![Some(Value::Str("a".into())), None])
        );
        assert!(matches!(form["address"], FormValue::Nested(_)));
    }

    #[test]
    fn test_parent_content_defaults_to_no_pages() {
        let parent: ParentDocument =
            serde_json::from_value(json!({"atms_slug": "a", "doc_slug": "d"})).unwrap();
        assert_eq!(parent.content, Some(vec![]));

        let all: ParentDocument =
            serde_json::from_value(json!({"atms_slug": "a", "doc_slug": "d", "content": null}))
                .unwrap();
        assert_eq!(all.content, None);
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = Metadata::new()
            .with_form(Form::new().with("amount", 3))
            .connect_artefact("order", Slug::new("order-1").unwrap());
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["client_env"], "test");
        assert_eq!(json["form"]["result"]["amount"], 3);
        assert_eq!(json["artefact"]["order"]["slug"], "order-1");
        assert_eq!(DocumentStatus::Waiting.code(), "102");
    }
}
