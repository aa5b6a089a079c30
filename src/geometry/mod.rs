//! Geometry
//!
//! Points and rectangles, freehand stroke parsing, and the mapping from
//! captured-image pixels to on-screen view coordinates.

mod mapper;
mod path;
mod types;

pub use mapper::{CoordinateMapper, ViewLayout};
pub use path::{parse_path, PathBuilder};
pub use types::{Point, Rect, Size};
