//! Lasso selection
//!
//! Decides which recognized words a lasso covers and assembles their text.

mod engine;
mod types;

pub use engine::{
    is_selected, overlap_percentage, select_elements, MIN_LASSO_POINTS, OVERLAP_THRESHOLD_PERCENT,
};
pub use types::{ElementIndex, SelectionResult};
