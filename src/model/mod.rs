//! Validated data model of the letxbe platform.
//!
//! Every type here is a plain data transfer object: it is built by the caller
//! before a request, or parsed from a response. Validation runs when values
//! are constructed or deserialized, never later.
//!
//! # Design Principles
//!
//! 1. **Explicit discriminators**: the wire format is untagged in several
//!    places (documents, clues, result nodes). Parsing inspects the JSON keys
//!    first, then dispatches to a strict parser for the selected variant.
//!
//! 2. **Recursive sum types**: result containers and projections are
//!    recursive enums. Lists of labels nest at most two levels deep, which is
//!    checked while parsing.
//!
//! 3. **No coercion**: booleans and numbers stay distinct, so `true != 1`.
//!
//! # Example
//!
//! ```
//! use letxbe::model::{LabelPrediction, Prediction, ResultMap, ResultNode};
//!
//! let mut result = ResultMap::new();
//! result.insert("total", ResultNode::Label(LabelPrediction::new(42.5)));
//! let prediction = Prediction::new(result).with_model_version("v1");
//! assert_eq!(prediction.result.labels().len(), 1);
//! ```

mod bbox;
mod bounds;
mod clue;
mod document;
mod entry;
mod ids;
mod label;
mod page;
mod projection;
mod results;
mod task;
mod value;

// Re-export core types for convenient access
pub use bbox::{BBox, BBOX_SCALE, MIN_BBOX_OVERLAP_PROPORTION};
pub use clue::{BBoxInPageClue, Clue, PageClue, ProjectionClue, ShapeClue, WordClue};
pub use document::{
    ActionCode, Artefact, ArtefactToConnect, ClientEnv, ConnectedArtefact, Document,
    DocumentInfo, DocumentStatus, Form, FormValue, Metadata, ParentDocument, Target,
};
pub use entry::entry_path;
pub use ids::{generate_short_unique_id, is_valid_slug, Slug};
pub use label::{
    ChildConnection, FeedbackVote, Label, LabelFeedback, LabelPrediction, LabelType, ResultLabel,
};
pub use page::{ImageFormat, ImageProperties, Line, Page, Word};
pub use projection::{
    ProjectionField, ProjectionMap, ProjectionNode, ProjectionRoot, ProjectionTarget,
};
pub use results::{Current, Feedback, FeedbackResponse, Prediction, ResultMap, ResultNode};
pub use task::{LogStatus, Task};
pub use value::{assert_equal_typed, Value};
