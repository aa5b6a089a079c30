//! Overlap selection
//!
//! A word is selected when at least [`OVERLAP_THRESHOLD_PERCENT`] of its
//! mapped frame lies inside the lasso's bounding box. Words are visited in
//! block → line → element order, so the selected text always reads in
//! document order regardless of the direction the lasso was drawn.
//!
//! The lasso is reduced to its axis-aligned bounding box rather than tested
//! as a polygon. Concave or self-intersecting strokes therefore select
//! everything inside their bounding box.

use crate::geometry::{CoordinateMapper, Point, Rect};
use crate::ocr::{join_words, RecognitionResult};

use super::types::{ElementIndex, SelectionResult};

/// Minimum share of a word's area, in percent, that must overlap the lasso
pub const OVERLAP_THRESHOLD_PERCENT: f64 = 40.0;

/// Minimum number of lasso points for a selection to be computed
pub const MIN_LASSO_POINTS: usize = 2;

/// Percentage of `word` covered by `region`.
///
/// Zero-area words never count as covered.
pub fn overlap_percentage(word: &Rect, region: &Rect) -> f64 {
    let word_area = word.area();
    if word_area <= 0.0 {
        return 0.0;
    }
    match word.intersection(region) {
        Some(overlap) => (overlap.area() / word_area) * 100.0,
        None => 0.0,
    }
}

/// Whether `region` covers enough of `word` to select it.
///
/// Compares `overlap * 100 >= threshold * word` instead of dividing, so a
/// ratio of exactly 40% is not lost to rounding.
pub fn is_selected(word: &Rect, region: &Rect) -> bool {
    let word_area = word.area();
    if word_area <= 0.0 {
        return false;
    }
    match word.intersection(region) {
        Some(overlap) => overlap.area() * 100.0 >= OVERLAP_THRESHOLD_PERCENT * word_area,
        None => false,
    }
}

/// Select the words of `recognition` covered by the lasso.
///
/// `lasso` is in view space; word frames are mapped into view space with
/// `mapper`. Returns `None` when the lasso has fewer than
/// [`MIN_LASSO_POINTS`] points; callers keep their previous selection in
/// that case.
pub fn select_elements(
    lasso: &[Point],
    recognition: &RecognitionResult,
    mapper: &CoordinateMapper,
) -> Option<SelectionResult> {
    if lasso.len() < MIN_LASSO_POINTS {
        return None;
    }
    let region = Rect::bounding(lasso)?;

    let mut selected = Vec::new();
    let mut words = Vec::new();

    for (block, line, element, word) in recognition.elements() {
        let frame = mapper.map_rect(&word.frame);
        if is_selected(&frame, &region) {
            selected.push(ElementIndex::new(block, line, element));
            words.push(word.text.as_str());
        }
    }

    let selected_text = if selected.is_empty() {
        None
    } else {
        Some(join_words(words.into_iter()))
    };

    tracing::debug!(
        "Lasso over {} words selected {}",
        recognition.word_count(),
        selected.len()
    );

    Some(SelectionResult {
        selected_elements: selected,
        selected_text,
    })
}
