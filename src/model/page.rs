//! Text laid out spatially: a parsed PDF page, a screenshot, a scan.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::bounds::{optional_rotation, percentage};

/// Encoding of a page image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Jpg,
    Tiff,
}

impl ImageFormat {
    /// File extension used for archive entries.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// Whether encoded bytes of type `kind` can be declared as this format.
    pub(crate) fn accepts(self, kind: imagesize::ImageType) -> bool {
        match self {
            ImageFormat::Png => matches!(kind, imagesize::ImageType::Png),
            ImageFormat::Jpeg | ImageFormat::Jpg => matches!(kind, imagesize::ImageType::Jpeg),
            ImageFormat::Tiff => matches!(kind, imagesize::ImageType::Tiff),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    /// `[width, height]` in pixels.
    pub size: [u32; 2],
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(alias = "word-caption")]
    pub word_caption: String,
    pub bbox: BBox,
    #[serde(deserialize_with = "percentage")]
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub bbox: BBox,
    pub words: Vec<Word>,
    #[serde(alias = "line-caption")]
    pub line_caption: String,
    /// Degrees, between -180 and 180.
    #[serde(default, deserialize_with = "optional_rotation")]
    pub rotation: Option<f64>,
    #[serde(deserialize_with = "percentage")]
    pub confidence: f64,
}

/// A page of a document, as produced by reading or OCR.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub file_uri: String,
    pub page_idx: i64,
    pub line_list: Vec<Line>,
    #[serde(default)]
    pub image_properties: Option<ImageProperties>,
}

impl Page {
    /// Iterates over every word of the page, line by line.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.line_list.iter().flat_map(|line| line.words.iter())
    }

    /// Concatenates line captions, one per line.
    pub fn text(&self) -> String {
        self.line_list
            .iter()
            .map(|line| line.line_caption.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_json() -> serde_json::Value {
        json!({
            "file_uri": "s3://bucket/doc.pdf",
            "page_idx": 0,
            "line_list": [{
                "bbox": {"x0": 0.1, "x1": 0.9, "y0": 0.1, "y1": 0.2},
                "line-caption": "Hello world",
                "confidence": 98.5,
                "words": [
                    {"word-caption": "Hello", "bbox": {"x0": 0.1, "x1": 0.4, "y0": 0.1, "y1": 0.2}, "confidence": 99},
                    {"word_caption": "world", "bbox": {"x0": 0.5, "x1": 0.9, "y0": 0.1, "y1": 0.2}, "confidence": 98}
                ]
            }],
            "image_properties": {"size": [1240, 1754], "format": "jpeg"}
        })
    }

    #[test]
    fn test_page_accepts_dashed_aliases() {
        let page: Page = serde_json::from_value(page_json()).unwrap();
        let words: Vec<&str> = page.words().map(|w| w.word_caption.as_str()).collect();
        assert_eq!(words, vec!["Hello", "world"]);
        assert_eq!(page.text(), "Hello world");

        let properties = page.image_properties.as_ref().unwrap();
        assert_eq!(properties.format, ImageFormat::Jpeg);
        assert_eq!(properties.rotation, 0.0);

        let out = serde_json::to_value(&page).unwrap();
        assert_eq!(out["line_list"][0]["line_caption"], "Hello world");
    }

    #[test]
    fn test_confidence_and_rotation_are_bounded() {
        let mut bad = page_json();
        bad["line_list"][0]["confidence"] = json!(100.5);
        assert!(serde_json::from_value::<Page>(bad).is_err());

        let mut bad = page_json();
        bad["line_list"][0]["rotation"] = json!(-181);
        assert!(serde_json::from_value::<Page>(bad).is_err());

        let mut ok = page_json();
        ok["line_list"][0]["rotation"] = json!(-180);
        assert!(serde_json::from_value::<Page>(ok).is_ok());
    }

    #[test]
    fn test_image_size_needs_two_values() {
        let mut bad = page_json();
        bad["image_properties"]["size"] = json!([1240]);
        assert!(serde_json::from_value::<Page>(bad).is_err());
    }

    #[test]
    fn test_image_format_accepts() {
        assert!(ImageFormat::Jpg.accepts(imagesize::ImageType::Jpeg));
        assert!(ImageFormat::Jpeg.accepts(imagesize::ImageType::Jpeg));
        assert!(!ImageFormat::Png.accepts(imagesize::ImageType::Jpeg));
        assert_eq!(ImageFormat::Tiff.to_string(), "tiff");
    }
}
