//! Recursive result containers shared by predictions, feedback and the current view.
//!
//! A result maps string keys to one of:
//! - a single label,
//! - a list of labels,
//! - a list of lists of labels (lists nest at most two levels deep),
//! - a nested result of the same family,
//! - a list of nested results.
//!
//! The wire format is untagged, so parsing inspects each JSON value. An object
//! holding at least one scalar (or null) entry is a label: labels always carry
//! a `lid` string. Any other object is a nested result. Keys are not checked
//! against the automatisme's schema; the server owns that.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::bounds::{check_range, optional_percentage, PERCENT_MAX};
use super::entry::{entry_path, grid_entry_path};
use super::label::{Label, LabelFeedback, LabelPrediction, ResultLabel};
use crate::error::LetxbeError;

/// A value stored under one key of a [`ResultMap`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultNode<L> {
    Label(L),
    Labels(Vec<L>),
    LabelGrid(Vec<Vec<L>>),
    Nested(ResultMap<L>),
    NestedList(Vec<ResultMap<L>>),
}

impl<L> ResultNode<L> {
    /// Empty lists all read back as `Labels`, so that is their only stored form.
    fn canonical(self) -> Self {
        match self {
            ResultNode::LabelGrid(rows) if rows.is_empty() => ResultNode::Labels(Vec::new()),
            ResultNode::NestedList(maps) if maps.is_empty() => ResultNode::Labels(Vec::new()),
            node => node,
        }
    }
}

/// A nested mapping from keys to [`ResultNode`]s of one label family.
///
/// An empty list stored under a key is always kept as an empty
/// [`ResultNode::Labels`], whichever list variant it was inserted as.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultMap<L>(BTreeMap<String, ResultNode<L>>);

impl<L> Default for ResultMap<L> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<L> ResultMap<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, returning the one previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, node: ResultNode<L>) -> Option<ResultNode<L>> {
        self.0.insert(key.into(), node.canonical())
    }

    pub fn get(&self, key: &str) -> Option<&ResultNode<L>> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ResultNode<L>> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultNode<L>)> {
        self.0.iter()
    }

    /// Returns every label with its entry path (`key`, `key[0]`, `a[0].b[1][2]`).
    pub fn labels(&self) -> Vec<(String, &L)> {
        let mut out = Vec::new();
        collect_labels(self, None, &mut out);
        out
    }
}

impl<L: ResultLabel> ResultMap<L> {
    /// Finds a label anywhere in the structure by its `lid`.
    pub fn find_label(&self, lid: &str) -> Option<&L> {
        self.labels()
            .into_iter()
            .map(|(_, label)| label)
            .find(|label| label.lid() == lid)
    }

    /// Builds a result from a JSON object, validating its shape.
    pub fn from_json_map(
        map: Map<String, JsonValue>,
        parent: Option<&str>,
    ) -> Result<Self, LetxbeError> {
        let mut result = BTreeMap::new();
        for (key, value) in map {
            let node = ResultNode::from_json(value, parent, &key)?;
            result.insert(key, node);
        }
        Ok(Self(result))
    }
}

impl<L> FromIterator<(String, ResultNode<L>)> for ResultMap<L> {
    fn from_iter<I: IntoIterator<Item = (String, ResultNode<L>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, node)| (key, node.canonical()))
                .collect(),
        )
    }
}

fn collect_labels<'a, L>(
    map: &'a ResultMap<L>,
    parent: Option<&str>,
    out: &mut Vec<(String, &'a L)>,
) {
    for (key, node) in map.iter() {
        match node {
            ResultNode::Label(label) => out.push((entry_path(parent, key, None), label)),
            ResultNode::Labels(labels) => {
                for (i, label) in labels.iter().enumerate() {
                    out.push((entry_path(parent, key, Some(i)), label));
                }
            }
            ResultNode::LabelGrid(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    for (j, label) in row.iter().enumerate() {
                        out.push((grid_entry_path(parent, key, i, j), label));
                    }
                }
            }
            ResultNode::Nested(nested) => {
                let path = entry_path(parent, key, None);
                collect_labels(nested, Some(&path), out);
            }
            ResultNode::NestedList(nested) => {
                for (i, map) in nested.iter().enumerate() {
                    let path = entry_path(parent, key, Some(i));
                    collect_labels(map, Some(&path), out);
                }
            }
        }
    }
}

fn is_label_object(map: &Map<String, JsonValue>) -> bool {
    map.values().any(|v| !v.is_object() && !v.is_array())
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}

fn shape_error(path: String, message: impl Into<String>) -> LetxbeError {
    LetxbeError::ResultShape {
        path,
        message: message.into(),
    }
}

fn parse_label<L: ResultLabel>(map: Map<String, JsonValue>, path: String) -> Result<L, LetxbeError> {
    serde_json::from_value(JsonValue::Object(map)).map_err(|source| shape_error(path, source.to_string()))
}

impl<L: ResultLabel> ResultNode<L> {
    fn from_json(value: JsonValue, parent: Option<&str>, key: &str) -> Result<Self, LetxbeError> {
        let path = entry_path(parent, key, None);
        match value {
            JsonValue::Object(map) if is_label_object(&map) => {
                Ok(ResultNode::Label(parse_label(map, path)?))
            }
            JsonValue::Object(map) => Ok(ResultNode::Nested(ResultMap::from_json_map(
                map,
                Some(&path),
            )?)),
            JsonValue::Array(items) => Self::list_from_json(items, parent, key),
            other => Err(shape_error(
                path,
                format!(
                    "expected a label, a list or a nested result, found {}",
                    json_kind(&other)
                ),
            )),
        }
    }

    fn list_from_json(
        items: Vec<JsonValue>,
        parent: Option<&str>,
        key: &str,
    ) -> Result<Self, LetxbeError> {
        let Some(first) = items.first() else {
            return Ok(ResultNode::Labels(Vec::new()));
        };

        match first {
            JsonValue::Object(map) if is_label_object(map) => {
                let mut labels = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let path = entry_path(parent, key, Some(i));
                    match item {
                        JsonValue::Object(map) if is_label_object(&map) => {
                            labels.push(parse_label(map, path)?)
                        }
                        other => {
                            return Err(shape_error(
                                path,
                                format!("expected a label, found {}", json_kind(&other)),
                            ))
                        }
                    }
                }
                Ok(ResultNode::Labels(labels))
            }
            JsonValue::Object(_) => {
                let mut nested = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let path = entry_path(parent, key, Some(i));
                    match item {
                        JsonValue::Object(map) if !is_label_object(&map) => {
                            nested.push(ResultMap::from_json_map(map, Some(&path))?)
                        }
                        other => {
                            return Err(shape_error(
                                path,
                                format!("expected a nested result, found {}", json_kind(&other)),
                            ))
                        }
                    }
                }
                Ok(ResultNode::NestedList(nested))
            }
            JsonValue::Array(_) => {
                let mut rows = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let cells = match item {
                        JsonValue::Array(cells) => cells,
                        other => {
                            return Err(shape_error(
                                entry_path(parent, key, Some(i)),
                                format!("expected a list of labels, found {}", json_kind(&other)),
                            ))
                        }
                    };
                    let mut row = Vec::with_capacity(cells.len());
                    for (j, cell) in cells.into_iter().enumerate() {
                        let path = grid_entry_path(parent, key, i, j);
                        match cell {
                            JsonValue::Object(map) if is_label_object(&map) => {
                                row.push(parse_label(map, path)?)
                            }
                            JsonValue::Array(_) => {
                                return Err(shape_error(
                                    path,
                                    "lists of labels cannot be nested more than two levels deep",
                                ))
                            }
                            other => {
                                return Err(shape_error(
                                    path,
                                    format!("expected a label, found {}", json_kind(&other)),
                                ))
                            }
                        }
                    }
                    rows.push(row);
                }
                Ok(ResultNode::LabelGrid(rows))
            }
            other => Err(shape_error(
                entry_path(parent, key, Some(0)),
                format!("expected a label or a nested result, found {}", json_kind(other)),
            )),
        }
    }
}

impl<'de, L: ResultLabel> Deserialize<'de> for ResultMap<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let map = Map::<String, JsonValue>::deserialize(deserializer)?;
        ResultMap::from_json_map(map, None).map_err(D::Error::custom)
    }
}

/// Model output attached to a target document.
///
/// `result` keys should match the prediction schema configured for the
/// automatisme; mismatching keys are accepted here and left to the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub model_version: Option<String>,
    /// Overall score, between 0 and 100.
    #[serde(default, deserialize_with = "optional_percentage")]
    score: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub result: ResultMap<LabelPrediction>,
}

impl Prediction {
    pub fn new(result: ResultMap<LabelPrediction>) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Result<Self, LetxbeError> {
        self.score = Some(check_range("score", score, 0.0, PERCENT_MAX)?);
        Ok(self)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }
}

/// Confirmations, deletions or corrections of a prediction's values.
///
/// Its result mirrors the structure of the prediction it refers to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub result: ResultMap<LabelFeedback>,
}

impl Feedback {
    pub fn new(result: ResultMap<LabelFeedback>) -> Self {
        Self {
            comment: String::new(),
            result,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// The prediction once feedback has been taken into account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub result: ResultMap<Label>,
}

/// Response to a posted [`Feedback`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// Ids of the labels whose stored value changed.
    pub updated_labels: Vec<String>,
}
