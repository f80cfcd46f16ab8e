//! Split-then-save: bounded chunks of task results.
//!
//! `save_and_finish` takes a fixed-position tuple of elements. A single
//! object always goes to chunk 0. A list is cut into slices of at most
//! [`MAX_SAVER_LIST_LEN`] elements, slice `i` going to chunk `i`. Every chunk
//! keeps the tuple's arity, with `null` where it has nothing for a position,
//! so concatenating the slices of a position in chunk order rebuilds the
//! original list.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::LetxbeError;
use crate::model::{Page, Prediction, ProjectionRoot};

/// Largest number of list elements sent in one save request.
pub const MAX_SAVER_LIST_LEN: usize = 10;

/// One positional element of the data saved for a task.
#[derive(Clone, Debug, PartialEq)]
pub enum SaverArg {
    Prediction(Prediction),
    Pages(Vec<Page>),
    Projections(Vec<ProjectionRoot>),
    /// Raw JSON: an object is a single element, an array a list. Anything
    /// else is rejected.
    Json(JsonValue),
}

impl From<Prediction> for SaverArg {
    fn from(prediction: Prediction) -> Self {
        SaverArg::Prediction(prediction)
    }
}

impl From<Vec<Page>> for SaverArg {
    fn from(pages: Vec<Page>) -> Self {
        SaverArg::Pages(pages)
    }
}

impl From<Vec<ProjectionRoot>> for SaverArg {
    fn from(projections: Vec<ProjectionRoot>) -> Self {
        SaverArg::Projections(projections)
    }
}

impl From<JsonValue> for SaverArg {
    fn from(value: JsonValue) -> Self {
        SaverArg::Json(value)
    }
}

enum Batchable {
    Single(JsonValue),
    List(Vec<JsonValue>),
}

fn to_json<S: Serialize>(value: &S) -> Result<JsonValue, LetxbeError> {
    serde_json::to_value(value).map_err(|source| LetxbeError::json("saved data", source))
}

fn list_to_json<S: Serialize>(items: &[S]) -> Result<Vec<JsonValue>, LetxbeError> {
    items.iter().map(to_json).collect()
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

impl Batchable {
    fn from_arg(position: usize, arg: &SaverArg) -> Result<Self, LetxbeError> {
        Ok(match arg {
            SaverArg::Prediction(prediction) => Batchable::Single(to_json(prediction)?),
            SaverArg::Pages(pages) => Batchable::List(list_to_json(pages)?),
            SaverArg::Projections(roots) => Batchable::List(list_to_json(roots)?),
            SaverArg::Json(JsonValue::Object(map)) => {
                Batchable::Single(JsonValue::Object(map.clone()))
            }
            SaverArg::Json(JsonValue::Array(items)) => Batchable::List(items.clone()),
            SaverArg::Json(other) => {
                return Err(LetxbeError::UnbatchableElement {
                    position,
                    found: json_kind(other),
                })
            }
        })
    }

    fn chunk_count(&self) -> usize {
        match self {
            Batchable::Single(_) => 1,
            Batchable::List(items) => items.len().div_ceil(MAX_SAVER_LIST_LEN).max(1),
        }
    }
}

/// Splits `data` into the bodies of successive save requests.
///
/// Every element is checked before any chunk is built. An empty `data`
/// yields no chunk. A single-element `data` yields bare values instead of
/// one-element arrays.
pub fn split_into_batches(data: &[SaverArg]) -> Result<Vec<JsonValue>, LetxbeError> {
    let elements = data
        .iter()
        .enumerate()
        .map(|(position, arg)| Batchable::from_arg(position, arg))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(chunk_count) = elements.iter().map(Batchable::chunk_count).max() else {
        return Ok(Vec::new());
    };
    let arity = elements.len();
    let mut chunks = vec![vec![JsonValue::Null; arity]; chunk_count];

    for (position, element) in elements.into_iter().enumerate() {
        match element {
            Batchable::Single(value) => chunks[0][position] = value,
            Batchable::List(items) if items.is_empty() => {
                chunks[0][position] = JsonValue::Array(Vec::new())
            }
            Batchable::List(items) => {
                let mut items = items.into_iter();
                for chunk in chunks.iter_mut() {
                    let slice: Vec<JsonValue> = items.by_ref().take(MAX_SAVER_LIST_LEN).collect();
                    if slice.is_empty() {
                        break;
                    }
                    chunk[position] = JsonValue::Array(slice);
                }
            }
        }
    }

    Ok(chunks
        .into_iter()
        .map(|chunk| {
            if arity == 1 {
                chunk.into_iter().next().unwrap_or(JsonValue::Null)
            } else {
                JsonValue::Array(chunk)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(n: usize) -> SaverArg {
        SaverArg::Json(JsonValue::Array((0..n).map(|i| json!({"i": i})).collect()))
    }

    #[test]
    fn test_single_object_is_unwrapped() {
        let chunks = split_into_batches(&[SaverArg::Prediction(Prediction::default())]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_object());
    }

    #[test]
    fn test_long_list_is_split_in_slices_of_ten() {
        let chunks = split_into_batches(&[SaverArg::Prediction(Prediction::default()), numbers(25)])
            .unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0][0].is_object());
        assert_eq!(chunks[0][1].as_array().unwrap().len(), 10);
        assert_eq!(chunks[1][0], JsonValue::Null);
        assert_eq!(chunks[1][1].as_array().unwrap().len(), 10);
        assert_eq!(chunks[2][1].as_array().unwrap().len(), 5);
        assert_eq!(chunks[2][1][0], json!({"i": 20}));
    }

    #[test]
    fn test_empty_list_is_kept_in_first_chunk() {
        let chunks = split_into_batches(&[numbers(0), numbers(12)]).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0][0], json!([]));
        assert_eq!(chunks[1][0], JsonValue::Null);
    }

    #[test]
    fn test_no_data_means_no_chunk() {
        assert!(split_into_batches(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unbatchable_element_fails_fast() {
        let err = split_into_batches(&[numbers(3), SaverArg::Json(json!("text"))]).unwrap_err();
        match err {
            LetxbeError::UnbatchableElement { position, found } => {
                assert_eq!(position, 1);
                assert_eq!(found, "a string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err_is_validation(&[SaverArg::Json(JsonValue::Null)]));
    }

    fn err_is_validation(data: &[SaverArg]) -> bool {
        split_into_batches(data).is_err_and(|err| err.is_validation())
    }
}
