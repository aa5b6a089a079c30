//! OCR Types
//!
//! The block → line → element hierarchy produced by a text recognizer for
//! one captured page. All frames are in pixels of the captured image.
//!
//! Recognizers disagree on how a frame is spelled (`left/top/width/height`,
//! `left/top/right/bottom` or `x/y/width/height`). Every shape is normalized
//! into a [`Rect`] while deserializing, so nothing downstream looks at the
//! raw shape again.

use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{Point, Rect};

/// Frame as reported by a recognizer
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RawFrame {
    LeftTopSize {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    LeftTopRightBottom {
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    },
    Origin {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl From<RawFrame> for Rect {
    fn from(frame: RawFrame) -> Self {
        match frame {
            RawFrame::LeftTopSize {
                left,
                top,
                width,
                height,
            } => Rect::new(left, top, width, height),
            RawFrame::LeftTopRightBottom {
                left,
                top,
                right,
                bottom,
            } => Rect::from_ltrb(left, top, right, bottom),
            RawFrame::Origin {
                x,
                y,
                width,
                height,
            } => Rect::new(x, y, width, height),
        }
    }
}

fn deserialize_frame<'de, D>(deserializer: D) -> Result<Rect, D::Error>
where
    D: Deserializer<'de>,
{
    RawFrame::deserialize(deserializer).map(Rect::from)
}

fn deserialize_optional_frame<'de, D>(deserializer: D) -> Result<Option<Rect>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawFrame>::deserialize(deserializer)?.map(Rect::from))
}

/// Single recognized word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Word text
    #[serde(default)]
    pub text: String,
    /// Bounding box (image pixels)
    #[serde(deserialize_with = "deserialize_frame")]
    pub frame: Rect,
}

impl TextElement {
    pub fn new(text: impl Into<String>, frame: Rect) -> Self {
        Self {
            text: text.into(),
            frame,
        }
    }
}

/// Line of words
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextLine {
    /// Line text, when the recognizer reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Line bounding box, when the recognizer reports it
    #[serde(
        default,
        deserialize_with = "deserialize_optional_frame",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame: Option<Rect>,
    /// Words in reading order
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

impl TextLine {
    pub fn new(elements: Vec<TextElement>) -> Self {
        Self {
            text: None,
            frame: None,
            elements,
        }
    }

    /// Words joined by single spaces, skipping empty ones
    pub fn joined_text(&self) -> String {
        join_words(self.elements.iter().map(|e| e.text.as_str()))
    }
}

#[derive(Deserialize)]
struct RawTextBlock {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_frame")]
    frame: Option<Rect>,
    #[serde(default)]
    lines: Vec<TextLine>,
}

/// Block of lines (paragraph, caption, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTextBlock")]
pub struct TextBlock {
    /// Block text; derived from the lines when the recognizer omits it
    pub text: String,
    /// Block bounding box; derived from the word frames when omitted
    pub frame: Rect,
    /// Lines in reading order
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Build a block whose text and frame are derived from its lines
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        RawTextBlock {
            text: None,
            frame: None,
            lines,
        }
        .into()
    }
}

impl From<RawTextBlock> for TextBlock {
    fn from(raw: RawTextBlock) -> Self {
        let text = raw.text.unwrap_or_else(|| {
            raw.lines
                .iter()
                .map(|line| line.text.clone().unwrap_or_else(|| line.joined_text()))
                .collect::<Vec<_>>()
                .join("\n")
        });

        let frame = raw
            .frame
            .or_else(|| {
                let corners: Vec<_> = raw
                    .lines
                    .iter()
                    .flat_map(|l| l.elements.iter())
                    .flat_map(|e| {
                        [
                            Point::new(e.frame.x, e.frame.y),
                            Point::new(e.frame.right(), e.frame.bottom()),
                        ]
                    })
                    .collect();
                Rect::bounding(&corners)
            })
            .unwrap_or_default();

        Self {
            text,
            frame,
            lines: raw.lines,
        }
    }
}

/// Recognition output for exactly one captured page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl RecognitionResult {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    /// Parse recognizer JSON output, normalizing every frame shape
    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        serde_json::from_str(json).map_err(|e| OcrError::InvalidOutput(e.to_string()))
    }

    /// No blocks were recognized
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every word with its (block, line, element) position, in reading order
    pub fn elements(&self) -> impl Iterator<Item = (usize, usize, usize, &TextElement)> {
        self.blocks.iter().enumerate().flat_map(|(b, block)| {
            block.lines.iter().enumerate().flat_map(move |(l, line)| {
                line.elements
                    .iter()
                    .enumerate()
                    .map(move |(e, element)| (b, l, e, element))
            })
        })
    }

    pub fn element(&self, block: usize, line: usize, element: usize) -> Option<&TextElement> {
        self.blocks
            .get(block)?
            .lines
            .get(line)?
            .elements
            .get(element)
    }

    pub fn word_count(&self) -> usize {
        self.elements().count()
    }
}

/// Join words with single spaces, skipping empty ones
pub(crate) fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ")
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Invalid recognizer output: {0}")]
    InvalidOutput(String),
}
