//! Normalized bounding boxes.

use serde::{Deserialize, Serialize};

use super::bounds::check_range;
use crate::error::LetxbeError;

/// Upper bound of every normalized coordinate.
pub const BBOX_SCALE: f64 = 1.0;

/// Default proportion used by [`BBox::x_overlap_with`] and [`BBox::y_overlap_with`].
pub const MIN_BBOX_OVERLAP_PROPORTION: f64 = 0.7;

/// An axis-aligned bounding box in normalized page coordinates.
///
/// Every coordinate lies in `[0, BBOX_SCALE]`. Unlike the field order,
/// tuple conversions use `(x0, y0, x1, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BBoxData")]
pub struct BBox {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

#[derive(Deserialize)]
struct BBoxData {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl TryFrom<BBoxData> for BBox {
    type Error = LetxbeError;

    fn try_from(data: BBoxData) -> Result<Self, Self::Error> {
        BBox::new(data.x0, data.x1, data.y0, data.y1)
    }
}

impl BBox {
    /// Creates a new bounding box, checking every coordinate against [`BBOX_SCALE`].
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Result<Self, LetxbeError> {
        Ok(Self {
            x0: check_range("x0", x0, 0.0, BBOX_SCALE)?,
            x1: check_range("x1", x1, 0.0, BBOX_SCALE)?,
            y0: check_range("y0", y0, 0.0, BBOX_SCALE)?,
            y1: check_range("y1", y1, 0.0, BBOX_SCALE)?,
        })
    }

    /// Creates a bounding box from `(x0, y0, x1, y1)`.
    pub fn from_tuple(values: (f64, f64, f64, f64)) -> Result<Self, LetxbeError> {
        let (x0, y0, x1, y1) = values;
        Self::new(x0, x1, y0, y1)
    }

    /// Returns `(x0, y0, x1, y1)`.
    #[inline]
    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x0, self.y0, self.x1, self.y1)
    }

    #[inline]
    pub fn x0(&self) -> f64 {
        self.x0
    }

    #[inline]
    pub fn x1(&self) -> f64 {
        self.x1
    }

    #[inline]
    pub fn y0(&self) -> f64 {
        self.y0
    }

    #[inline]
    pub fn y1(&self) -> f64 {
        self.y1
    }

    /// May be negative if the box is malformed (x1 < x0).
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// May be negative if the box is malformed (y1 < y0).
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// True when the horizontal overlap exceeds `threshold` times the narrower width.
    pub fn x_overlap_with(&self, other: &BBox, threshold: f64) -> bool {
        let overlap = self.x1.min(other.x1) - self.x0.max(other.x0);
        overlap > threshold * self.width().min(other.width())
    }

    /// True when the vertical overlap exceeds `threshold` times the shorter height.
    pub fn y_overlap_with(&self, other: &BBox, threshold: f64) -> bool {
        let overlap = self.y1.min(other.y1) - self.y0.max(other.y0);
        overlap > threshold * self.height().min(other.height())
    }

    /// True when `other` lies entirely inside this box (edges included).
    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.x1 >= other.x1 && self.y0 <= other.y0 && self.y1 >= other.y1
    }
}
