//! Clues: evidence locating a label's value in the source material.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::bbox::BBox;
use super::projection::{ProjectionRoot, ProjectionTarget};
use crate::error::LetxbeError;

/// Points to a page of a document.
///
/// For documents split from an original one, `page_idx` is the index of the
/// page in the original document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageClue {
    /// Value shown to users, usually the matched text.
    #[serde(default)]
    pub value: String,
    /// Role of the artefact holding the clue, or `None` for the document itself.
    #[serde(default)]
    pub role: Option<String>,
    pub page_idx: i64,
}

/// Locates a word in a [`Page`](super::Page).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordClue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub role: Option<String>,
    pub page_idx: i64,
    pub line_idx: i64,
    pub word_idx: i64,
    #[serde(default)]
    pub bbox: Option<BBox>,
}

/// Points to a bounding box in a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBoxInPageClue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub role: Option<String>,
    pub page_idx: i64,
    pub bbox: BBox,
}

/// A bounding box refined by a polygon, following the COCO convention
/// `[x1, y1, x2, y2, ..., xn, yn]`.
///
/// An empty polygon stands for the rectangle given by `bbox`. Otherwise the
/// polygon needs at least three points and an even number of coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeClueData")]
pub struct ShapeClue {
    pub value: String,
    pub role: Option<String>,
    pub page_idx: i64,
    pub bbox: BBox,
    polygon: Vec<f64>,
}

#[derive(Deserialize)]
struct ShapeClueData {
    #[serde(default)]
    value: String,
    #[serde(default)]
    role: Option<String>,
    page_idx: i64,
    bbox: BBox,
    #[serde(default)]
    polygon: Vec<f64>,
}

impl TryFrom<ShapeClueData> for ShapeClue {
    type Error = LetxbeError;

    fn try_from(data: ShapeClueData) -> Result<Self, Self::Error> {
        let mut clue = ShapeClue::new(data.page_idx, data.bbox, data.polygon)?;
        clue.value = data.value;
        clue.role = data.role;
        Ok(clue)
    }
}

impl ShapeClue {
    /// Creates a shape clue, validating the polygon.
    pub fn new(page_idx: i64, bbox: BBox, polygon: Vec<f64>) -> Result<Self, LetxbeError> {
        validate_polygon(&polygon)?;
        Ok(Self {
            value: String::new(),
            role: None,
            page_idx,
            bbox,
            polygon,
        })
    }

    pub fn polygon(&self) -> &[f64] {
        &self.polygon
    }

    /// Iterates over the `(x, y)` points of the polygon.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.polygon.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

fn validate_polygon(polygon: &[f64]) -> Result<(), LetxbeError> {
    if polygon.is_empty() {
        return Ok(());
    }
    if polygon.len() % 2 == 1 {
        return Err(LetxbeError::InvalidPolygon {
            message: format!(
                "a polygon must have an even number of coordinates, got {}",
                polygon.len()
            ),
        });
    }
    if polygon.len() < 6 {
        return Err(LetxbeError::InvalidPolygon {
            message: format!(
                "a polygon must have at least three points, got {}",
                polygon.len() / 2
            ),
        });
    }
    Ok(())
}

/// Path to a [`ProjectionField`](super::ProjectionField) of a document.
///
/// `pkey` selects the projection list, `xid` the [`ProjectionRoot`] in it and
/// `projection_entry` the field inside that root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionClue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub role: Option<String>,
    pub pkey: String,
    pub xid: String,
    pub projection_entry: String,
    /// Index of the first character of the token when the field is a string, else 0.
    #[serde(default)]
    pub token_idx: u32,
    /// Length of the token when the field is a string, else 0.
    #[serde(default)]
    pub length: u32,
}

impl ProjectionClue {
    /// Finds the root with this clue's `xid` and locates the entry in it.
    pub fn resolve<'a>(&self, roots: &'a [ProjectionRoot]) -> Option<ProjectionTarget<'a>> {
        roots
            .iter()
            .find(|root| root.xid == self.xid)
            .and_then(|root| root.locate(&self.projection_entry))
    }
}

/// Any clue attached to a label.
///
/// Clues are untagged on the wire. The variant is picked from the keys
/// present: `pkey` for projections, `polygon` for shapes, `line_idx` or
/// `word_idx` for words, `bbox` for boxes, otherwise a page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Clue {
    Projection(ProjectionClue),
    Shape(ShapeClue),
    Word(WordClue),
    BBoxInPage(BBoxInPageClue),
    Page(PageClue),
}

impl Clue {
    fn from_json_map(map: Map<String, JsonValue>) -> Result<Self, serde_json::Error> {
        let has = |key: &str| map.contains_key(key);
        let kind = if has("pkey") {
            ClueKind::Projection
        } else if has("polygon") {
            ClueKind::Shape
        } else if has("line_idx") || has("word_idx") {
            ClueKind::Word
        } else if has("bbox") {
            ClueKind::BBoxInPage
        } else {
            ClueKind::Page
        };

        let value = JsonValue::Object(map);
        Ok(match kind {
            ClueKind::Projection => Clue::Projection(serde_json::from_value(value)?),
            ClueKind::Shape => Clue::Shape(serde_json::from_value(value)?),
            ClueKind::Word => Clue::Word(serde_json::from_value(value)?),
            ClueKind::BBoxInPage => Clue::BBoxInPage(serde_json::from_value(value)?),
            ClueKind::Page => Clue::Page(serde_json::from_value(value)?),
        })
    }
}

enum ClueKind {
    Projection,
    Shape,
    Word,
    BBoxInPage,
    Page,
}

impl<'de> Deserialize<'de> for Clue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let map = Map::<String, JsonValue>::deserialize(deserializer)?;
        Clue::from_json_map(map).map_err(D::Error::custom)
    }
}

impl From<PageClue> for Clue {
    fn from(clue: PageClue) -> Self {
        Clue::Page(clue)
    }
}

impl From<WordClue> for Clue {
    fn from(clue: WordClue) -> Self {
        Clue::Word(clue)
    }
}

impl From<BBoxInPageClue> for Clue {
    fn from(clue: BBoxInPageClue) -> Self {
        Clue::BBoxInPage(clue)
    }
}

impl From<ShapeClue> for Clue {
    fn from(clue: ShapeClue) -> Self {
        Clue::Shape(clue)
    }
}

impl From<ProjectionClue> for Clue {
    fn from(clue: ProjectionClue) -> Self {
        Clue::Projection(clue)
    }
}
