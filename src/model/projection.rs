//! Projections: row-like extractions of a document's content.
//!
//! A [`ProjectionRoot`] mirrors one row of a table or one flat JSON form.
//! Its `result` maps field keys to fields, nested maps, or lists of either.
//! Every node carries a `projection_entry` path computed when the root is
//! built or parsed; [`ProjectionClue`](super::ProjectionClue)s use that path to
//! point back at a value.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use super::entry::entry_path;
use super::value::Value;

/// A leaf value of a projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionField {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub projection_entry: String,
}

impl ProjectionField {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            projection_entry: String::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            value: None,
            projection_entry: String::new(),
        }
    }
}

/// A nested mapping inside a projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMap {
    pub result: BTreeMap<String, ProjectionNode>,
    #[serde(default)]
    pub projection_entry: String,
}

impl ProjectionMap {
    pub fn new(result: BTreeMap<String, ProjectionNode>) -> Self {
        Self {
            result,
            projection_entry: String::new(),
        }
    }
}

/// A value stored under a key of a projection result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectionNode {
    Field(ProjectionField),
    Fields(Vec<ProjectionField>),
    Map(ProjectionMap),
    Maps(Vec<ProjectionMap>),
}

// An object holding a `result` object is a map, any other object a field.
fn is_map_object(value: &JsonValue) -> bool {
    value.get("result").is_some_and(JsonValue::is_object)
}

impl ProjectionNode {
    fn from_json(value: JsonValue) -> Result<Self, String> {
        match value {
            JsonValue::Object(_) if is_map_object(&value) => serde_json::from_value(value)
                .map(ProjectionNode::Map)
                .map_err(|e| e.to_string()),
            JsonValue::Object(_) => serde_json::from_value(value)
                .map(ProjectionNode::Field)
                .map_err(|e| e.to_string()),
            JsonValue::Array(items) => {
                let maps = items.iter().filter(|item| is_map_object(item)).count();
                if items.iter().any(|item| !item.is_object()) {
                    Err("projection lists may only hold fields or maps".to_string())
                } else if maps == 0 {
                    serde_json::from_value(JsonValue::Array(items))
                        .map(ProjectionNode::Fields)
                        .map_err(|e| e.to_string())
                } else if maps == items.len() {
                    serde_json::from_value(JsonValue::Array(items))
                        .map(ProjectionNode::Maps)
                        .map_err(|e| e.to_string())
                } else {
                    Err("a projection list cannot mix fields and maps".to_string())
                }
            }
            other => Err(format!(
                "expected a projection field, map or list, found {}",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ProjectionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let value = JsonValue::deserialize(deserializer)?;
        ProjectionNode::from_json(value).map_err(D::Error::custom)
    }
}

/// Either node found at an entry path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectionTarget<'a> {
    Field(&'a ProjectionField),
    Map(&'a ProjectionMap),
}

/// The top-level projection of a document row, identified by `xid`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectionRootData")]
pub struct ProjectionRoot {
    /// Client-provided identifier of the row.
    pub xid: String,
    pub result: BTreeMap<String, ProjectionNode>,
    /// Always empty for a root.
    pub projection_entry: String,
}

#[derive(Deserialize)]
struct ProjectionRootData {
    xid: String,
    result: BTreeMap<String, ProjectionNode>,
}

impl From<ProjectionRootData> for ProjectionRoot {
    fn from(data: ProjectionRootData) -> Self {
        ProjectionRoot::new(data.xid, data.result)
    }
}

impl ProjectionRoot {
    /// Creates a root and computes the entry path of every nested node.
    pub fn new(xid: impl Into<String>, result: BTreeMap<String, ProjectionNode>) -> Self {
        let mut root = Self {
            xid: xid.into(),
            result,
            projection_entry: String::new(),
        };
        root.recompute_entries();
        root
    }

    /// Recomputes every `projection_entry` with a depth-first walk of `result`.
    ///
    /// Call this after editing `result` in place.
    pub fn recompute_entries(&mut self) {
        self.projection_entry.clear();
        assign_entries(&mut self.result, None);
    }

    /// Returns the field or map stored at `entry`, if any.
    pub fn locate(&self, entry: &str) -> Option<ProjectionTarget<'_>> {
        locate_in(&self.result, entry)
    }
}

fn assign_entries(result: &mut BTreeMap<String, ProjectionNode>, parent: Option<&str>) {
    for (key, node) in result.iter_mut() {
        match node {
            ProjectionNode::Field(field) => {
                field.projection_entry = entry_path(parent, key, None);
            }
            ProjectionNode::Fields(fields) => {
                for (index, field) in fields.iter_mut().enumerate() {
                    field.projection_entry = entry_path(parent, key, Some(index));
                }
            }
            ProjectionNode::Map(map) => {
                let location = entry_path(parent, key, None);
                assign_entries(&mut map.result, Some(&location));
                map.projection_entry = location;
            }
            ProjectionNode::Maps(maps) => {
                for (index, map) in maps.iter_mut().enumerate() {
                    let location = entry_path(parent, key, Some(index));
                    assign_entries(&mut map.result, Some(&location));
                    map.projection_entry = location;
                }
            }
        }
    }
}

fn locate_in<'a>(
    result: &'a BTreeMap<String, ProjectionNode>,
    entry: &str,
) -> Option<ProjectionTarget<'a>> {
    for node in result.values() {
        let found = match node {
            ProjectionNode::Field(field) => {
                (field.projection_entry == entry).then_some(ProjectionTarget::Field(field))
            }
            ProjectionNode::Fields(fields) => fields
                .iter()
                .find(|field| field.projection_entry == entry)
                .map(ProjectionTarget::Field),
            ProjectionNode::Map(map) => locate_in_map(map, entry),
            ProjectionNode::Maps(maps) => maps.iter().find_map(|map| locate_in_map(map, entry)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn locate_in_map<'a>(map: &'a ProjectionMap, entry: &str) -> Option<ProjectionTarget<'a>> {
    if map.projection_entry == entry {
        Some(ProjectionTarget::Map(map))
    } else {
        locate_in(&map.result, entry)
    }
}
