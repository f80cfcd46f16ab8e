//! Labels: atomic pieces of information about a document.
//!
//! Three flavours share the same core (`lid`, `value`, `clues`, `children`):
//! - [`LabelPrediction`] adds a score and a model version,
//! - [`LabelFeedback`] adds a source and a vote,
//! - [`Label`] is the plain form used by the derived "current" view.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::bounds::{check_range, optional_percentage, PERCENT_MAX};
use super::clue::Clue;
use super::ids::generate_short_unique_id;
use super::value::Value;
use crate::error::LetxbeError;

/// Wire tag of prediction and feedback labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Prediction,
    Feedback,
}

/// Vote carried by a [`LabelFeedback`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackVote {
    #[default]
    Valid,
    Invalid,
}

/// Points to a document produced by splitting the labelled one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildConnection {
    pub atms_slug: String,
    pub doc_slug: String,
}

/// Common behaviour of the label flavours stored in result containers.
pub trait ResultLabel: Clone + Debug + PartialEq + Serialize + DeserializeOwned {
    fn lid(&self) -> &str;
    fn value(&self) -> Option<&Value>;
    fn clues(&self) -> &[Clue];
}

impl LabelType {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelType::Prediction => "prediction",
            LabelType::Feedback => "feedback",
        }
    }
}

fn prediction_tag() -> LabelType {
    LabelType::Prediction
}

fn feedback_tag() -> LabelType {
    LabelType::Feedback
}

fn expect_tag<'de, D: Deserializer<'de>>(
    deserializer: D,
    expected: LabelType,
) -> Result<LabelType, D::Error> {
    use serde::de::Error;

    let found = LabelType::deserialize(deserializer)?;
    if found == expected {
        Ok(found)
    } else {
        Err(D::Error::custom(format!(
            "expected label_type \"{}\", found \"{}\"",
            expected.as_str(),
            found.as_str()
        )))
    }
}

fn prediction_tag_only<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LabelType, D::Error> {
    expect_tag(deserializer, LabelType::Prediction)
}

fn feedback_tag_only<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LabelType, D::Error> {
    expect_tag(deserializer, LabelType::Feedback)
}

/// A single predicted value, as stored in a [`Prediction`](super::Prediction).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    #[serde(default = "prediction_tag", deserialize_with = "prediction_tag_only")]
    label_type: LabelType,
    #[serde(default = "generate_short_unique_id")]
    pub lid: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub clues: Vec<Clue>,
    #[serde(default)]
    pub children: Option<Vec<ChildConnection>>,
    #[serde(default, deserialize_with = "optional_percentage")]
    score: Option<f64>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl LabelPrediction {
    /// Creates a prediction for `value` with a fresh `lid`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_value(Some(value.into()))
    }

    /// Creates a prediction holding no value.
    pub fn absent() -> Self {
        Self::with_value(None)
    }

    fn with_value(value: Option<Value>) -> Self {
        Self {
            label_type: LabelType::Prediction,
            lid: generate_short_unique_id(),
            value,
            clues: Vec::new(),
            children: None,
            score: None,
            model_version: None,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = lid.into();
        self
    }

    pub fn with_clue(mut self, clue: impl Into<Clue>) -> Self {
        self.clues.push(clue.into());
        self
    }

    /// Sets the score, which must lie between 0 and 100.
    pub fn with_score(mut self, score: f64) -> Result<Self, LetxbeError> {
        self.score = Some(check_range("score", score, 0.0, PERCENT_MAX)?);
        Ok(self)
    }

    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ChildConnection>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }
}

impl ResultLabel for LabelPrediction {
    fn lid(&self) -> &str {
        &self.lid
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn clues(&self) -> &[Clue] {
        &self.clues
    }
}

/// A confirmation, invalidation or correction of a predicted value.
///
/// For multi-valued fields, a value is invalidated by sending it back with
/// [`FeedbackVote::Invalid`]. A single-valued field can simply be given a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelFeedback {
    #[serde(default = "feedback_tag", deserialize_with = "feedback_tag_only")]
    label_type: LabelType,
    #[serde(default = "generate_short_unique_id")]
    pub lid: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub clues: Vec<Clue>,
    #[serde(default)]
    pub children: Option<Vec<ChildConnection>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub vote: FeedbackVote,
}

impl LabelFeedback {
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_value(Some(value.into()))
    }

    pub fn absent() -> Self {
        Self::with_value(None)
    }

    fn with_value(value: Option<Value>) -> Self {
        Self {
            label_type: LabelType::Feedback,
            lid: generate_short_unique_id(),
            value,
            clues: Vec::new(),
            children: None,
            source: None,
            vote: FeedbackVote::Valid,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = lid.into();
        self
    }

    pub fn with_clue(mut self, clue: impl Into<Clue>) -> Self {
        self.clues.push(clue.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_vote(mut self, vote: FeedbackVote) -> Self {
        self.vote = vote;
        self
    }
}

impl ResultLabel for LabelFeedback {
    fn lid(&self) -> &str {
        &self.lid
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn clues(&self) -> &[Clue] {
        &self.clues
    }
}

/// A label of the current view, once feedback has been applied to predictions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label_type: Option<LabelType>,
    #[serde(default = "generate_short_unique_id")]
    pub lid: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub clues: Vec<Clue>,
    #[serde(default)]
    pub children: Option<Vec<ChildConnection>>,
}

impl Label {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            label_type: None,
            lid: generate_short_unique_id(),
            value: Some(value.into()),
            clues: Vec::new(),
            children: None,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<String>) -> Self {
        self.lid = lid.into();
        self
    }
}

impl ResultLabel for Label {
    fn lid(&self) -> &str {
        &self.lid
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn clues(&self) -> &[Clue] {
        &self.clues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_wire_format() {
        let label = LabelPrediction::new("Einstein")
            .with_lid("09aa9edc")
            .with_score(100.0)
            .unwrap();
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(
            json,
            json!({
                "label_type": "prediction",
                "lid": "09aa9edc",
                "value": "Einstein",
                "clues": [],
                "children": null,
                "score": 100.0,
                "model_version": null
            })
        );
    }

    #[test]
    fn test_prediction_score_is_bounded() {
        assert!(LabelPrediction::absent().with_score(100.1).is_err());
        assert!(LabelPrediction::absent().with_score(-1.0).is_err());
        let parsed = serde_json::from_value::<LabelPrediction>(json!({"value": 1, "score": 150}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_missing_lid_is_generated() {
        let label: LabelFeedback = serde_json::from_value(json!({"value": "Bohr"})).unwrap();
        assert_eq!(label.lid.len(), 12);
        assert_eq!(label.vote, FeedbackVote::Valid);
    }

    #[test]
    fn test_feedback_vote_wire_values() {
        let label = LabelFeedback::new("Bohr")
            .with_vote(FeedbackVote::Invalid)
            .with_source("M2M");
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json["vote"], "Invalid");
        assert_eq!(json["label_type"], "feedback");
        assert_eq!(json["source"], "M2M");
    }

    #[test]
    fn test_label_type_must_match_flavour() {
        let feedback = json!({"label_type": "feedback", "lid": "x", "value": 1, "vote": "Invalid"});
        let err = serde_json::from_value::<LabelPrediction>(feedback.clone()).unwrap_err();
        assert!(err.to_string().contains("expected label_type \"prediction\""));
        assert!(serde_json::from_value::<LabelFeedback>(feedback).is_ok());

        let prediction = json!({"label_type": "prediction", "lid": "y", "value": 2});
        let err = serde_json::from_value::<LabelFeedback>(prediction.clone()).unwrap_err();
        assert!(err.to_string().contains("expected label_type \"feedback\""));
        assert!(serde_json::from_value::<LabelPrediction>(prediction).is_ok());
    }

    #[test]
    fn test_bool_value_survives_parsing() {
        let label: Label = serde_json::from_value(json!({"lid": "x", "value": true})).unwrap();
        assert_eq!(label.value, Some(Value::Bool(true)));
        assert_ne!(label.value, Some(Value::Int(1)));
    }
}
